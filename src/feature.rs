//! Internal feature model used by the tiling pipeline.
//!
//! All coordinates live in a projected unit square where `(0, 0)` is the
//! north-west corner of the world and `(1, 1)` the south-east corner.
//! Points additionally carry a simplification importance so that lower
//! levels of detail can be reconstructed without re-running the
//! simplifier.

use geojson::JsonObject;
use std::sync::Arc;

/// A projected point with its simplification importance.
///
/// The importance is `0` for points that have not been ranked yet, `1`
/// for points that must always be retained (endpoints and clip
/// intersections), or the squared deviation the point contributes to its
/// line's shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePoint {
    pub x: f64,
    pub y: f64,
    pub importance: f64,
}

impl TilePoint {
    /// Create an unranked point.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            importance: 0.0,
        }
    }

    pub(crate) fn ranked(x: f64, y: f64, importance: f64) -> Self {
        Self { x, y, importance }
    }
}

/// A line or polygon ring together with its derived size metrics.
///
/// `area` (unsigned shoelace area, meaningful for closed rings) and
/// `dist` (cumulative Manhattan length) are computed once at projection
/// time. Clipped sub-rings reuse the parent's values unrecomputed.
#[derive(Debug, Clone)]
pub struct Ring {
    pub points: Vec<TilePoint>,
    pub area: f64,
    pub dist: f64,
}

impl Ring {
    /// Build a ring and compute its size metrics in one pass.
    pub fn from_points(points: Vec<TilePoint>) -> Self {
        let mut area = 0.0;
        let mut dist = 0.0;

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            area += a.x * b.y - b.x * a.y;
            // Manhattan length avoids a square root per segment
            dist += (b.x - a.x).abs() + (b.y - a.y).abs();
        }

        Self {
            points,
            area: (area / 2.0).abs(),
            dist,
        }
    }

    /// Build a ring that inherits metrics from an ancestor ring.
    pub(crate) fn with_metrics(points: Vec<TilePoint>, area: f64, dist: f64) -> Self {
        Self { points, area, dist }
    }
}

/// Projected feature geometry.
///
/// Multi-geometries are flattened at projection time: a MultiLineString
/// becomes `Lines` with one ring per member, a MultiPolygon becomes
/// `Polygons` with the member rings concatenated (each polygon's outer
/// ring precedes its holes).
#[derive(Debug, Clone)]
pub enum Geometry {
    Points(Vec<TilePoint>),
    Lines(Vec<Ring>),
    Polygons(Vec<Ring>),
}

/// A projected feature with its tags and bounding box.
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: Geometry,
    /// GeoJSON properties, shared across all clipped copies of the feature.
    pub tags: Option<Arc<JsonObject>>,
    /// Lower bound of all geometry in projected space.
    pub min: [f64; 2],
    /// Upper bound of all geometry in projected space.
    pub max: [f64; 2],
}

impl Feature {
    /// Build a feature, scanning all rings once for the bounding box.
    pub fn new(geometry: Geometry, tags: Option<Arc<JsonObject>>) -> Self {
        let mut min = [f64::INFINITY, f64::INFINITY];
        let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];

        let mut expand = |p: &TilePoint| {
            min[0] = min[0].min(p.x);
            min[1] = min[1].min(p.y);
            max[0] = max[0].max(p.x);
            max[1] = max[1].max(p.y);
        };

        match &geometry {
            Geometry::Points(points) => points.iter().for_each(&mut expand),
            Geometry::Lines(rings) | Geometry::Polygons(rings) => {
                for ring in rings {
                    ring.points.iter().for_each(&mut expand);
                }
            }
        }

        Self {
            geometry,
            tags,
            min,
            max,
        }
    }

    /// Build a feature that inherits an ancestor's bounding box.
    ///
    /// A feature that got clipped will likely get clipped again on the
    /// next zoom level, so the box is not recomputed.
    pub(crate) fn with_bbox(
        geometry: Geometry,
        tags: Option<Arc<JsonObject>>,
        min: [f64; 2],
        max: [f64; 2],
    ) -> Self {
        Self {
            geometry,
            tags,
            min,
            max,
        }
    }
}
