//! Importance-recording Douglas-Peucker simplification.
//!
//! Instead of deleting points, the simplifier writes each point's
//! importance (the maximum squared perpendicular deviation it
//! contributes) into the point itself. Callers later decide retention by
//! comparing importance against a zoom-dependent tolerance, which makes
//! level-of-detail reconstruction free of recomputation.

use crate::feature::TilePoint;

/// Rank every point of a line or ring in place.
///
/// Endpoints always receive importance `1`, the maximum, so they survive
/// any tolerance. Interior points receive the squared distance at which
/// Douglas-Peucker split on them, or keep `0` if the split never reached
/// them. Importances are fixed once written: lowering the tolerance can
/// only add retained points, never drop previously retained ones.
///
/// The traversal is iterative with an explicit interval stack, so deeply
/// nested splits cannot exhaust the call stack.
pub fn simplify(points: &mut [TilePoint], tolerance: f64) {
    if points.is_empty() {
        return;
    }

    let sq_tolerance = tolerance * tolerance;
    let mut first = 0;
    let mut last = points.len() - 1;

    points[first].importance = 1.0;
    points[last].importance = 1.0;

    if last < 2 {
        return;
    }

    let mut stack: Vec<(usize, usize)> = Vec::new();

    loop {
        let mut max_sq_dist = 0.0;
        let mut index = first;

        for i in first + 1..last {
            let sq_dist = sq_seg_dist(&points[i], &points[first], &points[last]);
            if sq_dist > max_sq_dist {
                index = i;
                max_sq_dist = sq_dist;
            }
        }

        if max_sq_dist > sq_tolerance {
            // record the split point, refine its right side now and
            // queue the left side for later
            points[index].importance = max_sq_dist;
            stack.push((first, index));
            first = index;
        } else {
            match stack.pop() {
                Some((f, l)) => {
                    first = f;
                    last = l;
                }
                None => break,
            }
        }
    }
}

/// Squared distance from `p` to the segment `(a, b)`.
fn sq_seg_dist(p: &TilePoint, a: &TilePoint, b: &TilePoint) -> f64 {
    let mut x = a.x;
    let mut y = a.y;
    let mut dx = b.x - x;
    let mut dy = b.y - y;

    if dx != 0.0 || dy != 0.0 {
        let t = ((p.x - x) * dx + (p.y - y) * dy) / (dx * dx + dy * dy);

        if t > 1.0 {
            x = b.x;
            y = b.y;
        } else if t > 0.0 {
            x += dx * t;
            y += dy * t;
        }
    }

    dx = p.x - x;
    dy = p.y - y;

    dx * dx + dy * dy
}
