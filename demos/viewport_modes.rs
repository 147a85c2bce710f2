//! Viewport querying and the vector/raster switch.
//!
//! Run with: `cargo run --example viewport_modes`

use geo::{Coord, Rect};
use tilery::{Config, RangeIndex, RenderMode, RenderModePolicy, TileIndex, TileRaster};

fn main() -> tilery::Result<()> {
    env_logger::init();

    // a grid of points across Europe
    let features: Vec<geojson::Feature> = (0..400)
        .map(|i| geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                -5.0 + (i % 20) as f64,
                40.0 + (i / 20) as f64 * 0.5,
            ]))),
            id: None,
            properties: None,
            foreign_members: None,
        })
        .collect();

    let range = RangeIndex::new(features.clone());
    let mut policy = RenderModePolicy::new(50);

    let viewports = [
        ("continent", Rect::new(Coord { x: -10.0, y: 35.0 }, Coord { x: 20.0, y: 55.0 })),
        ("city", Rect::new(Coord { x: 1.8, y: 44.8 }, Coord { x: 2.6, y: 45.3 })),
    ];

    for (label, viewport) in viewports {
        let visible = range.count(&viewport);
        match policy.evaluate(visible) {
            Some(RenderMode::Raster) => {
                println!("{label}: {visible} features, switching to raster tiles");
            }
            Some(RenderMode::Vector) => {
                println!("{label}: {visible} features, switching to vector objects");
            }
            None => println!("{label}: {visible} features, staying in {:?}", policy.mode()),
        }
    }

    // paint one raster tile for the busy viewport
    let collection = geojson::GeoJson::FeatureCollection(geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    });
    let mut index = TileIndex::new(&collection, Config::default())?;
    let extent = index.config().extent;

    if let Some(tile) = index.get_tile(2, 2, 1) {
        let raster = TileRaster::new(256);
        let mask = raster.paint(tile, extent);
        let covered = mask.iter().filter(|&&v| v > 0).count();
        println!("rasterized z2 2/1: {covered} of {} pixels covered", mask.len());
    }

    Ok(())
}
