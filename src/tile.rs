//! Tile assembly and pixel-space transformation.
//!
//! A tile collects the features that survived clipping for its square,
//! filtered down to the detail its zoom level needs. Geometry stays in
//! fractional tile space until the tile is actually served, at which
//! point it is converted once to fixed-point pixel coordinates.

use crate::feature::{Feature, Geometry, Ring, TilePoint};
use geojson::JsonObject;
use std::sync::Arc;

/// Feature geometry as stored inside a tile.
///
/// Ring metadata is no longer needed once the per-zoom filtering has
/// happened, so rings are plain point lists here.
#[derive(Debug, Clone)]
pub enum TileGeometry {
    Points(Vec<TilePoint>),
    Lines(Vec<Vec<TilePoint>>),
    Polygons(Vec<Vec<TilePoint>>),
}

/// A feature carried by a tile.
#[derive(Debug, Clone)]
pub struct TileFeature {
    pub geometry: TileGeometry,
    pub tags: Option<Arc<JsonObject>>,
}

/// One square of the tile pyramid.
///
/// Returned tiles are pixel-space: coordinates cover
/// `[-buffer, extent + buffer]` relative to the tile. Treat served
/// tiles as read-only; they are cached and shared between calls.
#[derive(Debug, Clone)]
pub struct Tile {
    pub features: Vec<TileFeature>,
    /// Points seen while assembling the tile, before filtering.
    pub num_points: usize,
    /// Points that survived importance filtering.
    pub num_simplified: usize,
    /// Features offered to the tile, including fully filtered ones.
    pub num_features: usize,
    pub x: u32,
    pub y: u32,
    /// `2^zoom` of this tile.
    pub z2: u64,
    /// Whether geometry has been converted to pixel space.
    pub transformed: bool,
    /// Untiled input, retained until this tile's children exist so the
    /// index can drill down later.
    pub(crate) source: Option<Vec<Feature>>,
}

/// Assemble a tile from clipped features.
///
/// With `no_simplify` (the final zoom level) every point of every
/// surviving ring is kept. Otherwise rings whose precomputed size falls
/// under the tolerance are dropped whole, and surviving rings keep only
/// points whose importance exceeds the squared tolerance.
pub(crate) fn create_tile(
    features: &[Feature],
    z2: u64,
    x: u32,
    y: u32,
    tolerance: f64,
    no_simplify: bool,
) -> Tile {
    let mut tile = Tile {
        features: Vec::new(),
        num_points: 0,
        num_simplified: 0,
        num_features: 0,
        x,
        y,
        z2,
        transformed: false,
        source: None,
    };

    for feature in features {
        tile.num_features += 1;
        add_feature(&mut tile, feature, tolerance, no_simplify);
    }

    tile
}

fn add_feature(tile: &mut Tile, feature: &Feature, tolerance: f64, no_simplify: bool) {
    let sq_tolerance = tolerance * tolerance;

    let geometry = match &feature.geometry {
        Geometry::Points(points) => {
            // points are never simplified
            tile.num_points += points.len();
            tile.num_simplified += points.len();
            TileGeometry::Points(points.clone())
        }
        Geometry::Lines(rings) => TileGeometry::Lines(keep_rings(
            tile,
            rings,
            tolerance,
            sq_tolerance,
            no_simplify,
            false,
        )),
        Geometry::Polygons(rings) => TileGeometry::Polygons(keep_rings(
            tile,
            rings,
            tolerance,
            sq_tolerance,
            no_simplify,
            true,
        )),
    };

    let keep = match &geometry {
        TileGeometry::Points(points) => !points.is_empty(),
        TileGeometry::Lines(rings) | TileGeometry::Polygons(rings) => !rings.is_empty(),
    };

    if keep {
        tile.features.push(TileFeature {
            geometry,
            tags: feature.tags.clone(),
        });
    }
}

fn keep_rings(
    tile: &mut Tile,
    rings: &[Ring],
    tolerance: f64,
    sq_tolerance: f64,
    no_simplify: bool,
    is_polygon: bool,
) -> Vec<Vec<TilePoint>> {
    let mut kept = Vec::with_capacity(rings.len());

    for ring in rings {
        // coarse filter: the whole ring is too small to matter at this zoom
        let too_small = if is_polygon {
            ring.area < sq_tolerance
        } else {
            ring.dist < tolerance
        };
        if !no_simplify && too_small {
            tile.num_points += ring.points.len();
            continue;
        }

        let mut simplified = Vec::new();
        for p in &ring.points {
            if no_simplify || p.importance > sq_tolerance {
                simplified.push(*p);
                tile.num_simplified += 1;
            }
            tile.num_points += 1;
        }

        kept.push(simplified);
    }

    kept
}

/// Convert a tile's geometry to pixel coordinates, in place.
///
/// Idempotent: a tile is transformed at most once and then flagged.
pub(crate) fn transform_tile(tile: &mut Tile, extent: u16) {
    if tile.transformed {
        return;
    }

    let z2 = tile.z2 as f64;
    let tx = tile.x as f64;
    let ty = tile.y as f64;

    for feature in &mut tile.features {
        match &mut feature.geometry {
            TileGeometry::Points(points) => {
                for p in points {
                    *p = transform_point(p, extent, z2, tx, ty);
                }
            }
            TileGeometry::Lines(rings) | TileGeometry::Polygons(rings) => {
                for ring in rings {
                    for p in ring {
                        *p = transform_point(p, extent, z2, tx, ty);
                    }
                }
            }
        }
    }

    tile.transformed = true;
}

/// Map one projected point into a tile's pixel space.
pub(crate) fn transform_point(p: &TilePoint, extent: u16, z2: f64, tx: f64, ty: f64) -> TilePoint {
    TilePoint {
        x: (extent as f64 * (p.x * z2 - tx)).round(),
        y: (extent as f64 * (p.y * z2 - ty)).round(),
        importance: p.importance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_feature(coords: &[(f64, f64)], polygon: bool) -> Feature {
        let ring = Ring::from_points(coords.iter().map(|&(x, y)| TilePoint::new(x, y)).collect());
        let geometry = if polygon {
            Geometry::Polygons(vec![ring])
        } else {
            Geometry::Lines(vec![ring])
        };
        Feature::new(geometry, None)
    }

    #[test]
    fn test_point_features_fully_kept() {
        let feature = Feature::new(
            Geometry::Points(vec![TilePoint::new(0.1, 0.1), TilePoint::new(0.2, 0.2)]),
            None,
        );
        let tile = create_tile(&[feature], 1, 0, 0, 0.01, false);
        assert_eq!(tile.num_features, 1);
        assert_eq!(tile.num_points, 2);
        assert_eq!(tile.num_simplified, 2);
        assert_eq!(tile.features.len(), 1);
    }

    #[test]
    fn test_tiny_line_dropped_by_dist() {
        let feature = ring_feature(&[(0.5, 0.5), (0.5001, 0.5)], false);
        let tile = create_tile(&[feature], 1, 0, 0, 0.01, false);
        // counted but filtered out
        assert_eq!(tile.num_features, 1);
        assert_eq!(tile.num_points, 2);
        assert!(tile.features.is_empty());
    }

    #[test]
    fn test_tiny_polygon_dropped_by_area() {
        let feature = ring_feature(
            &[
                (0.5, 0.5),
                (0.5001, 0.5),
                (0.5001, 0.5001),
                (0.5, 0.5),
            ],
            true,
        );
        let tile = create_tile(&[feature], 1, 0, 0, 0.01, false);
        assert!(tile.features.is_empty());
    }

    #[test]
    fn test_importance_filter_keeps_ranked_points() {
        let mut points = vec![
            TilePoint::new(0.0, 0.0),
            TilePoint::new(0.4, 0.3),
            TilePoint::new(0.5, 0.0),
            TilePoint::new(0.6, 0.001),
            TilePoint::new(1.0, 0.0),
        ];
        crate::simplify::simplify(&mut points, 0.0001);
        let feature = Feature::new(Geometry::Lines(vec![Ring::from_points(points)]), None);

        let tile = create_tile(&[feature], 1, 0, 0, 0.01, false);
        match &tile.features[0].geometry {
            TileGeometry::Lines(rings) => {
                // endpoints and the big spike survive, the tiny wiggle does not
                let kept = &rings[0];
                assert!(kept.len() < 5);
                assert_eq!(kept.first().unwrap().importance, 1.0);
                assert_eq!(kept.last().unwrap().importance, 1.0);
                assert!(kept.iter().any(|p| p.x == 0.4));
                assert!(kept.iter().all(|p| p.x != 0.6));
            }
            other => panic!("expected lines, got {other:?}"),
        }
        assert!(tile.num_simplified < tile.num_points);
    }

    #[test]
    fn test_no_simplify_keeps_everything() {
        let feature = ring_feature(&[(0.0, 0.0), (0.5, 0.0001), (1.0, 0.0)], false);
        let tile = create_tile(&[feature], 1, 0, 0, 0.25, true);
        match &tile.features[0].geometry {
            TileGeometry::Lines(rings) => assert_eq!(rings[0].len(), 3),
            other => panic!("expected lines, got {other:?}"),
        }
    }

    #[test]
    fn test_transform_is_idempotent() {
        let feature = Feature::new(Geometry::Points(vec![TilePoint::new(0.5, 0.25)]), None);
        let mut tile = create_tile(&[feature], 2, 0, 0, 0.0, true);

        transform_tile(&mut tile, 4096);
        let first = match &tile.features[0].geometry {
            TileGeometry::Points(points) => points[0],
            other => panic!("expected points, got {other:?}"),
        };
        assert_eq!(first.x, 4096.0);
        assert_eq!(first.y, 2048.0);

        transform_tile(&mut tile, 4096);
        let second = match &tile.features[0].geometry {
            TileGeometry::Points(points) => points[0],
            other => panic!("expected points, got {other:?}"),
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_transform_offsets_by_tile_coordinate() {
        let feature = Feature::new(Geometry::Points(vec![TilePoint::new(0.75, 0.75)]), None);
        let mut tile = create_tile(&[feature], 2, 1, 1, 0.0, true);
        transform_tile(&mut tile, 4096);
        match &tile.features[0].geometry {
            TileGeometry::Points(points) => {
                assert_eq!(points[0].x, 2048.0);
                assert_eq!(points[0].y, 2048.0);
            }
            other => panic!("expected points, got {other:?}"),
        }
    }
}
