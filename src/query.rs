//! Viewport queries and the vector/raster switching policy.
//!
//! A map layer asks two questions on every viewport change: which
//! features intersect the view, and is that few enough to render them
//! as interactive vector objects. The r-tree here answers the first;
//! [`RenderModePolicy`] answers the second, flipping to raster tiles
//! when the viewport gets too busy for per-feature interactivity.

use geo::Rect;
use geojson::{Feature, FeatureCollection, Value};
use rstar::{AABB, RTree, RTreeObject};

/// A feature's bounding box, indexed for r-tree lookup.
#[derive(Debug, Clone)]
struct FeatureEnvelope {
    index: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl RTreeObject for FeatureEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Bounding-box index over a GeoJSON feature set.
///
/// Geometry stays in geographic coordinates; queries take a lon/lat
/// viewport rectangle and return references into the owned feature
/// list.
pub struct RangeIndex {
    tree: RTree<FeatureEnvelope>,
    features: Vec<Feature>,
}

impl RangeIndex {
    /// Bulk-load an index over the given features.
    ///
    /// Features without usable geometry are kept in the list but never
    /// returned by queries.
    pub fn new(features: Vec<Feature>) -> Self {
        let envelopes: Vec<FeatureEnvelope> = features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                feature_bounds(feature).map(|(min, max)| FeatureEnvelope { index, min, max })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(envelopes),
            features,
        }
    }

    /// Index a whole FeatureCollection.
    pub fn from_collection(collection: FeatureCollection) -> Self {
        Self::new(collection.features)
    }

    /// Features whose bounding box intersects the viewport.
    ///
    /// Non-finite bounds are rejected with a warning; a degenerate
    /// (zero-width or zero-height) viewport yields an empty result.
    pub fn query(&self, viewport: &Rect<f64>) -> Vec<&Feature> {
        let Some(envelope) = viewport_envelope(viewport) else {
            return Vec::new();
        };

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|hit| &self.features[hit.index])
            .collect()
    }

    /// Number of features intersecting the viewport, without
    /// materializing them.
    pub fn count(&self, viewport: &Rect<f64>) -> usize {
        let Some(envelope) = viewport_envelope(viewport) else {
            return 0;
        };

        self.tree.locate_in_envelope_intersecting(&envelope).count()
    }

    /// Number of indexed features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Validate a viewport rectangle into an r-tree envelope.
fn viewport_envelope(viewport: &Rect<f64>) -> Option<AABB<[f64; 2]>> {
    let min = viewport.min();
    let max = viewport.max();

    if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
        log::warn!("rejecting viewport query with non-finite bounds");
        return None;
    }

    // a collapsed viewport selects nothing
    if viewport.width() <= 0.0 || viewport.height() <= 0.0 {
        return None;
    }

    Some(AABB::from_corners([min.x, min.y], [max.x, max.y]))
}

/// Geographic bounding box of a GeoJSON feature.
fn feature_bounds(feature: &Feature) -> Option<([f64; 2], [f64; 2])> {
    let geometry = feature.geometry.as_ref()?;

    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    extend_bounds(&geometry.value, &mut min, &mut max);

    if min[0].is_finite() { Some((min, max)) } else { None }
}

fn extend_bounds(value: &Value, min: &mut [f64; 2], max: &mut [f64; 2]) {
    match value {
        Value::Point(position) => extend_position(position, min, max),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            for position in positions {
                extend_position(position, min, max);
            }
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            for line in lines {
                for position in line {
                    extend_position(position, min, max);
                }
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                for ring in rings {
                    for position in ring {
                        extend_position(position, min, max);
                    }
                }
            }
        }
        Value::GeometryCollection(members) => {
            for member in members {
                extend_bounds(&member.value, min, max);
            }
        }
    }
}

fn extend_position(position: &[f64], min: &mut [f64; 2], max: &mut [f64; 2]) {
    if position.len() >= 2 {
        min[0] = min[0].min(position[0]);
        min[1] = min[1].min(position[1]);
        max[0] = max[0].max(position[0]);
        max[1] = max[1].max(position[1]);
    }
}

/// How the consuming layer should render the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Interactive per-feature vector objects.
    Vector,
    /// Rasterized tiles; faster, not interactive.
    Raster,
}

/// Threshold switch between vector and raster rendering.
///
/// Re-evaluated on every viewport change and box selection; switching
/// is idempotent, so callers only react when `evaluate` reports a
/// transition.
#[derive(Debug)]
pub struct RenderModePolicy {
    max_features: usize,
    mode: RenderMode,
}

impl RenderModePolicy {
    /// Policy starting in vector mode.
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            mode: RenderMode::Vector,
        }
    }

    /// The mode currently in effect.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Re-evaluate against the number of visible features.
    ///
    /// Returns the new mode on a transition, `None` when the current
    /// mode is already correct.
    pub fn evaluate(&mut self, visible_features: usize) -> Option<RenderMode> {
        let desired = if visible_features > self.max_features {
            RenderMode::Raster
        } else {
            RenderMode::Vector
        };

        if desired == self.mode {
            None
        } else {
            self.mode = desired;
            Some(desired)
        }
    }
}
