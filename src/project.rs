//! GeoJSON conversion and spherical-Mercator projection.
//!
//! Input geometry in WGS84 `[lon, lat]` degrees is projected onto the
//! unit square and turned into the internal feature model. Lines and
//! rings are simplified immediately after projection so every later
//! stage can filter by precomputed importance.

use crate::feature::{Feature, Geometry, Ring, TilePoint};
use crate::simplify::simplify;
use geojson::{GeoJson, JsonObject, Position, Value};
use std::f64::consts::PI;
use std::sync::Arc;

/// Convert a GeoJSON document into projected features.
///
/// Accepts a Feature, FeatureCollection, bare Geometry or
/// GeometryCollection. Features that cannot be converted (no geometry,
/// or positions with fewer than two coordinates) are logged and skipped
/// rather than failing the whole pass.
pub(crate) fn convert(data: &GeoJson, tolerance: f64) -> Vec<Feature> {
    let mut features = Vec::new();

    match data {
        GeoJson::FeatureCollection(collection) => {
            for feature in &collection.features {
                convert_feature(&mut features, feature, tolerance);
            }
        }
        GeoJson::Feature(feature) => convert_feature(&mut features, feature, tolerance),
        GeoJson::Geometry(geometry) => convert_geometry(&mut features, geometry, None, tolerance),
    }

    features
}

fn convert_feature(out: &mut Vec<Feature>, feature: &geojson::Feature, tolerance: f64) {
    let Some(geometry) = feature.geometry.as_ref() else {
        log::warn!("skipping feature without geometry");
        return;
    };

    let tags = feature.properties.clone().map(Arc::new);
    convert_geometry(out, geometry, tags, tolerance);
}

fn convert_geometry(
    out: &mut Vec<Feature>,
    geometry: &geojson::Geometry,
    tags: Option<Arc<JsonObject>>,
    tolerance: f64,
) {
    let converted = match &geometry.value {
        Value::Point(position) => {
            project_positions(std::slice::from_ref(position)).map(Geometry::Points)
        }
        Value::MultiPoint(positions) => project_positions(positions).map(Geometry::Points),
        Value::LineString(positions) => {
            project_ring(positions, tolerance).map(|ring| Geometry::Lines(vec![ring]))
        }
        Value::MultiLineString(lines) => lines
            .iter()
            .map(|line| project_ring(line, tolerance))
            .collect::<Option<Vec<Ring>>>()
            .map(Geometry::Lines),
        Value::Polygon(rings) => rings
            .iter()
            .map(|ring| project_ring(ring, tolerance))
            .collect::<Option<Vec<Ring>>>()
            .map(Geometry::Polygons),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|rings| rings.iter())
            .map(|ring| project_ring(ring, tolerance))
            .collect::<Option<Vec<Ring>>>()
            .map(Geometry::Polygons),
        Value::GeometryCollection(members) => {
            for member in members {
                convert_geometry(out, member, tags.clone(), tolerance);
            }
            return;
        }
    };

    match converted {
        // a feature without a single point can never match a tile
        Some(converted) if !geometry_is_empty(&converted) => {
            out.push(Feature::new(converted, tags));
        }
        Some(_) => {}
        None => log::warn!("skipping feature with malformed coordinates"),
    }
}

fn geometry_is_empty(geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Points(points) => points.is_empty(),
        Geometry::Lines(rings) | Geometry::Polygons(rings) => {
            rings.iter().all(|ring| ring.points.is_empty())
        }
    }
}

/// Project a list of raw positions. Point geometry is never simplified.
fn project_positions(positions: &[Position]) -> Option<Vec<TilePoint>> {
    positions.iter().map(|p| project_point(p)).collect()
}

/// Project one line or ring and attach its size metrics.
fn project_ring(positions: &[Position], tolerance: f64) -> Option<Ring> {
    let mut points = project_positions(positions)?;
    if tolerance > 0.0 {
        simplify(&mut points, tolerance);
    }
    Some(Ring::from_points(points))
}

/// Spherical-Mercator projection onto the unit square.
///
/// Latitudes beyond the projection's range clamp to the square's edge.
fn project_point(position: &Position) -> Option<TilePoint> {
    if position.len() < 2 {
        return None;
    }

    let sin = (position[1] * PI / 180.0).sin();
    let x = position[0] / 360.0 + 0.5;
    let y = (0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI).clamp(0.0, 1.0);

    Some(TilePoint::new(x, y))
}
