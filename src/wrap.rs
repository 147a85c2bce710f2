//! Antimeridian handling.
//!
//! Geometry crossing the date line projects onto both edges of the unit
//! square. Before tiling, a copy of everything near each edge is clipped
//! out of the neighboring world copy, shifted by one world width and
//! merged back in, so edge tiles render without seams.

use crate::clip::{Axis, clip};
use crate::feature::{Feature, Geometry};

/// Merge shifted world copies of the features around the date line.
///
/// `buffer` is the tile buffer expressed as a fraction of the extent.
/// Returns the input unchanged when nothing lives within a buffer of
/// either edge.
pub(crate) fn wrap(features: Vec<Feature>, buffer: f64) -> Vec<Feature> {
    let left = clip(&features, 1.0, -1.0 - buffer, buffer, Axis::X);
    let right = clip(&features, 1.0, 1.0 - buffer, 2.0 + buffer, Axis::X);

    if left.is_none() && right.is_none() {
        return features;
    }

    let center = clip(&features, 1.0, -buffer, 1.0 + buffer, Axis::X).unwrap_or_default();

    let mut merged = Vec::new();
    if let Some(left) = left {
        merged.extend(shift_features(left, 1.0));
    }
    merged.extend(center);
    if let Some(right) = right {
        merged.extend(shift_features(right, -1.0));
    }

    merged
}

fn shift_features(mut features: Vec<Feature>, offset: f64) -> Vec<Feature> {
    for feature in &mut features {
        match &mut feature.geometry {
            Geometry::Points(points) => {
                for p in points {
                    p.x += offset;
                }
            }
            Geometry::Lines(rings) | Geometry::Polygons(rings) => {
                for ring in rings {
                    for p in &mut ring.points {
                        p.x += offset;
                    }
                }
            }
        }
        feature.min[0] += offset;
        feature.max[0] += offset;
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Ring, TilePoint};

    fn line_feature(coords: &[(f64, f64)]) -> Feature {
        Feature::new(
            Geometry::Lines(vec![Ring::from_points(
                coords.iter().map(|&(x, y)| TilePoint::new(x, y)).collect(),
            )]),
            None,
        )
    }

    #[test]
    fn test_interior_features_untouched() {
        let features = vec![line_feature(&[(0.3, 0.5), (0.6, 0.5)])];
        let wrapped = wrap(features, 64.0 / 4096.0);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].min[0], 0.3);
    }

    #[test]
    fn test_edge_feature_contributes_to_both_sides() {
        // hugging the right edge of the world
        let features = vec![line_feature(&[(0.995, 0.5), (0.999, 0.5)])];
        let wrapped = wrap(features, 64.0 / 4096.0);

        // center copy plus a shifted copy near x = 0
        assert_eq!(wrapped.len(), 2);
        let mins: Vec<f64> = wrapped.iter().map(|f| f.min[0]).collect();
        assert!(mins.iter().any(|&m| m > 0.9));
        assert!(mins.iter().any(|&m| m < 0.0));
    }

    #[test]
    fn test_shifted_copy_moves_points_and_bbox_together() {
        let features = vec![line_feature(&[(0.001, 0.5), (0.005, 0.5)])];
        let wrapped = wrap(features, 64.0 / 4096.0);

        let shifted = wrapped
            .iter()
            .find(|f| f.min[0] > 0.9)
            .expect("left-edge feature should produce a right-world copy");
        match &shifted.geometry {
            Geometry::Lines(rings) => {
                for p in &rings[0].points {
                    assert!(p.x > 0.9);
                }
            }
            other => panic!("expected lines, got {other:?}"),
        }
    }
}
