//! Stripe clipping along a single axis.
//!
//! The tiler never clips against a full rectangle at once; it slices the
//! feature set twice per axis instead, which keeps the hot loop a simple
//! two-boundary classification of consecutive vertex pairs.

use crate::feature::{Feature, Geometry, Ring, TilePoint};
use smallvec::SmallVec;

/// Clip axis selector, also providing the boundary interpolation for
/// that axis. Intersection points are pinned to importance `1` so they
/// survive any simplification tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    fn get(self, p: &TilePoint) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    fn intersect(self, a: &TilePoint, b: &TilePoint, k: f64) -> TilePoint {
        match self {
            Axis::X => TilePoint::ranked(k, (k - a.x) * (b.y - a.y) / (b.x - a.x) + a.y, 1.0),
            Axis::Y => TilePoint::ranked((k - a.y) * (b.x - a.x) / (b.y - a.y) + a.x, k, 1.0),
        }
    }
}

/// Clip `features` to the interval `[k1/scale, k2/scale]` along `axis`.
///
/// Returns `None` when no feature survives. Features whose bounding box
/// lies entirely inside the interval are reused as-is; boxes entirely
/// outside are dropped without touching their points.
pub(crate) fn clip(
    features: &[Feature],
    scale: f64,
    k1: f64,
    k2: f64,
    axis: Axis,
) -> Option<Vec<Feature>> {
    let k1 = k1 / scale;
    let k2 = k2 / scale;

    let mut clipped = Vec::new();

    for feature in features {
        let min = feature.min[axis.index()];
        let max = feature.max[axis.index()];

        if min >= k1 && max <= k2 {
            // trivial accept
            clipped.push(feature.clone());
            continue;
        } else if min > k2 || max < k1 {
            // trivial reject
            continue;
        }

        let geometry = match &feature.geometry {
            Geometry::Points(points) => {
                let kept: Vec<TilePoint> = points
                    .iter()
                    .filter(|p| {
                        let v = axis.get(p);
                        v >= k1 && v <= k2
                    })
                    .copied()
                    .collect();
                if kept.is_empty() {
                    continue;
                }
                Geometry::Points(kept)
            }
            Geometry::Lines(rings) => {
                let slices = clip_rings(rings, k1, k2, axis, false);
                if slices.is_empty() {
                    continue;
                }
                Geometry::Lines(slices.into_vec())
            }
            Geometry::Polygons(rings) => {
                let slices = clip_rings(rings, k1, k2, axis, true);
                if slices.is_empty() {
                    continue;
                }
                Geometry::Polygons(slices.into_vec())
            }
        };

        clipped.push(Feature::with_bbox(
            geometry,
            feature.tags.clone(),
            feature.min,
            feature.max,
        ));
    }

    if clipped.is_empty() { None } else { Some(clipped) }
}

/// Clip every ring against the two boundary lines.
///
/// Open geometry is split into a new slice at each exit from the
/// interval; closed rings stay a single slice and are re-closed if
/// clipping broke the loop.
fn clip_rings(
    rings: &[Ring],
    k1: f64,
    k2: f64,
    axis: Axis,
    closed: bool,
) -> SmallVec<[Ring; 1]> {
    let mut slices = SmallVec::new();

    for ring in rings {
        let points = &ring.points;
        if points.is_empty() {
            continue;
        }

        let mut slice: Vec<TilePoint> = Vec::new();
        let len = points.len();

        for j in 0..len - 1 {
            let a = points[j];
            let b = points[j + 1];
            let ak = axis.get(&a);
            let bk = axis.get(&b);

            if ak < k1 {
                if bk > k2 {
                    // ---|-----|-->
                    slice.push(axis.intersect(&a, &b, k1));
                    slice.push(axis.intersect(&a, &b, k2));
                    if !closed {
                        flush_slice(&mut slices, &mut slice, ring);
                    }
                } else if bk >= k1 {
                    // ---|-->  |
                    slice.push(axis.intersect(&a, &b, k1));
                }
            } else if ak > k2 {
                if bk < k1 {
                    // <--|-----|---
                    slice.push(axis.intersect(&a, &b, k2));
                    slice.push(axis.intersect(&a, &b, k1));
                    if !closed {
                        flush_slice(&mut slices, &mut slice, ring);
                    }
                } else if bk <= k2 {
                    // |  <--|---
                    slice.push(axis.intersect(&a, &b, k2));
                }
            } else {
                slice.push(a);

                if bk < k1 {
                    // <--|---  |
                    slice.push(axis.intersect(&a, &b, k1));
                    if !closed {
                        flush_slice(&mut slices, &mut slice, ring);
                    }
                } else if bk > k2 {
                    // |  ---|-->
                    slice.push(axis.intersect(&a, &b, k2));
                    if !closed {
                        flush_slice(&mut slices, &mut slice, ring);
                    }
                }
                // | --> | : b is handled as the next segment's start
            }
        }

        // the last point ends no segment, add it if it is in range
        let a = points[len - 1];
        let ak = axis.get(&a);
        if ak >= k1 && ak <= k2 {
            slice.push(a);
        }

        // close the ring if clipping broke the loop
        if closed && !slice.is_empty() {
            let first = slice[0];
            let last = slice[slice.len() - 1];
            if first.x != last.x || first.y != last.y {
                slice.push(first);
            }
        }

        flush_slice(&mut slices, &mut slice, ring);
    }

    slices
}

fn flush_slice(slices: &mut SmallVec<[Ring; 1]>, slice: &mut Vec<TilePoint>, parent: &Ring) {
    if !slice.is_empty() {
        // the parent's area/dist are carried over unrecomputed: a slice
        // dropping below the visibility threshold because of clipping is
        // rare, so the threshold test runs against the original metrics
        slices.push(Ring::with_metrics(
            std::mem::take(slice),
            parent.area,
            parent.dist,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_feature(coords: &[(f64, f64)]) -> Feature {
        Feature::new(
            Geometry::Points(coords.iter().map(|&(x, y)| TilePoint::new(x, y)).collect()),
            None,
        )
    }

    fn line_feature(coords: &[(f64, f64)]) -> Feature {
        Feature::new(
            Geometry::Lines(vec![Ring::from_points(
                coords.iter().map(|&(x, y)| TilePoint::new(x, y)).collect(),
            )]),
            None,
        )
    }

    fn polygon_feature(coords: &[(f64, f64)]) -> Feature {
        Feature::new(
            Geometry::Polygons(vec![Ring::from_points(
                coords.iter().map(|&(x, y)| TilePoint::new(x, y)).collect(),
            )]),
            None,
        )
    }

    fn xs(feature: &Feature) -> Vec<f64> {
        match &feature.geometry {
            Geometry::Points(points) => points.iter().map(|p| p.x).collect(),
            Geometry::Lines(rings) | Geometry::Polygons(rings) => rings
                .iter()
                .flat_map(|r| r.points.iter().map(|p| p.x))
                .collect(),
        }
    }

    #[test]
    fn test_points_kept_by_coordinate() {
        let feature = points_feature(&[(0.1, 0.5), (0.4, 0.5), (0.9, 0.5)]);
        let clipped = clip(&[feature], 1.0, 0.0, 0.5, Axis::X).unwrap();
        assert_eq!(xs(&clipped[0]), vec![0.1, 0.4]);
    }

    #[test]
    fn test_points_complementary_clips_reproduce_input() {
        let feature = points_feature(&[(0.1, 0.5), (0.4, 0.5), (0.45, 0.5), (0.9, 0.5)]);

        let left = clip(std::slice::from_ref(&feature), 1.0, 0.0, 0.42, Axis::X).unwrap();
        let right = clip(std::slice::from_ref(&feature), 1.0, 0.42, 1.0, Axis::X).unwrap();

        let mut merged = xs(&left[0]);
        merged.extend(xs(&right[0]));
        merged.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(merged, vec![0.1, 0.4, 0.45, 0.9]);
    }

    #[test]
    fn test_trivial_reject_returns_none() {
        let feature = points_feature(&[(0.1, 0.5)]);
        assert!(clip(&[feature], 1.0, 0.6, 0.9, Axis::X).is_none());
    }

    #[test]
    fn test_trivial_accept_reuses_feature() {
        let feature = line_feature(&[(0.2, 0.2), (0.3, 0.3)]);
        let clipped = clip(&[feature], 1.0, 0.0, 1.0, Axis::X).unwrap();
        assert_eq!(xs(&clipped[0]), vec![0.2, 0.3]);
    }

    #[test]
    fn test_line_exiting_range_splits_slices() {
        // enters, exits, re-enters: two slices expected
        let feature = line_feature(&[(0.1, 0.0), (0.6, 0.0), (0.1, 0.1), (0.6, 0.1)]);
        let clipped = clip(&[feature], 1.0, 0.0, 0.4, Axis::X).unwrap();

        match &clipped[0].geometry {
            Geometry::Lines(rings) => {
                assert_eq!(rings.len(), 2);
                for ring in rings {
                    for p in &ring.points {
                        assert!(p.x <= 0.4 + 1e-12);
                    }
                }
            }
            other => panic!("expected lines, got {other:?}"),
        }
    }

    #[test]
    fn test_line_boundary_points_always_retained() {
        let feature = line_feature(&[(0.1, 0.0), (0.9, 0.0)]);
        let clipped = clip(&[feature], 1.0, 0.0, 0.5, Axis::X).unwrap();

        match &clipped[0].geometry {
            Geometry::Lines(rings) => {
                let last = rings[0].points.last().unwrap();
                assert_eq!(last.x, 0.5);
                assert_eq!(last.importance, 1.0);
            }
            other => panic!("expected lines, got {other:?}"),
        }
    }

    #[test]
    fn test_polygon_ring_is_reclosed() {
        let feature = polygon_feature(&[
            (0.2, 0.2),
            (0.8, 0.2),
            (0.8, 0.8),
            (0.2, 0.8),
            (0.2, 0.2),
        ]);
        let clipped = clip(&[feature], 1.0, 0.0, 0.5, Axis::X).unwrap();

        match &clipped[0].geometry {
            Geometry::Polygons(rings) => {
                assert_eq!(rings.len(), 1);
                let points = &rings[0].points;
                let first = points.first().unwrap();
                let last = points.last().unwrap();
                assert_eq!(first.x, last.x);
                assert_eq!(first.y, last.y);
            }
            other => panic!("expected polygons, got {other:?}"),
        }
    }

    #[test]
    fn test_polygon_complementary_clips_keep_closure() {
        let feature = polygon_feature(&[
            (0.2, 0.2),
            (0.8, 0.2),
            (0.8, 0.8),
            (0.2, 0.8),
            (0.2, 0.2),
        ]);

        for (k1, k2) in [(0.0, 0.5), (0.5, 1.0)] {
            let clipped = clip(std::slice::from_ref(&feature), 1.0, k1, k2, Axis::X).unwrap();
            match &clipped[0].geometry {
                Geometry::Polygons(rings) => {
                    let points = &rings[0].points;
                    assert!(points.len() >= 4);
                    assert_eq!(points.first().unwrap().x, points.last().unwrap().x);
                    assert_eq!(points.first().unwrap().y, points.last().unwrap().y);
                }
                other => panic!("expected polygons, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_clipped_ring_inherits_parent_metrics() {
        let feature = polygon_feature(&[
            (0.2, 0.2),
            (0.8, 0.2),
            (0.8, 0.8),
            (0.2, 0.8),
            (0.2, 0.2),
        ]);
        let (area, dist) = match &feature.geometry {
            Geometry::Polygons(rings) => (rings[0].area, rings[0].dist),
            _ => unreachable!(),
        };

        let clipped = clip(&[feature], 1.0, 0.0, 0.5, Axis::X).unwrap();
        match &clipped[0].geometry {
            Geometry::Polygons(rings) => {
                assert_eq!(rings[0].area, area);
                assert_eq!(rings[0].dist, dist);
            }
            other => panic!("expected polygons, got {other:?}"),
        }
    }

    #[test]
    fn test_clipped_feature_inherits_parent_bbox() {
        let feature = line_feature(&[(0.1, 0.0), (0.9, 0.0)]);
        let clipped = clip(&[feature], 1.0, 0.0, 0.5, Axis::X).unwrap();
        assert_eq!(clipped[0].min, [0.1, 0.0]);
        assert_eq!(clipped[0].max, [0.9, 0.0]);
    }

    #[test]
    fn test_scale_divides_boundaries() {
        // interval [1, 2] at scale 4 is [0.25, 0.5] in projected space
        let feature = points_feature(&[(0.2, 0.5), (0.3, 0.5), (0.6, 0.5)]);
        let clipped = clip(&[feature], 4.0, 1.0, 2.0, Axis::X).unwrap();
        assert_eq!(xs(&clipped[0]), vec![0.3]);
    }

    #[test]
    fn test_y_axis_clip() {
        let feature = line_feature(&[(0.5, 0.1), (0.5, 0.9)]);
        let clipped = clip(&[feature], 1.0, 0.0, 0.5, Axis::Y).unwrap();
        match &clipped[0].geometry {
            Geometry::Lines(rings) => {
                let last = rings[0].points.last().unwrap();
                assert_eq!(last.y, 0.5);
            }
            other => panic!("expected lines, got {other:?}"),
        }
    }
}
