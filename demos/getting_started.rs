//! Build a tile index from a small dataset and inspect a few tiles.
//!
//! Run with: `cargo run --example getting_started`

use tilery::{Config, TileGeometry, TileIndexBuilder};

fn main() -> tilery::Result<()> {
    env_logger::init();

    let data: tilery::GeoJson = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Brandenburg Gate" },
                "geometry": { "type": "Point", "coordinates": [13.3777, 52.5163] }
            },
            {
                "type": "Feature",
                "properties": { "name": "Spree" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [
                        [13.2, 52.53], [13.3, 52.52], [13.38, 52.51],
                        [13.45, 52.50], [13.53, 52.49]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Tiergarten" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [13.33, 52.508], [13.39, 52.508], [13.39, 52.518],
                        [13.33, 52.518], [13.33, 52.508]
                    ]]
                }
            }
        ]
    }"#
    .parse()
    .expect("valid GeoJSON");

    let mut index = TileIndexBuilder::new()
        .config(Config::default().with_index_max_zoom(4))
        .data(data)
        .build()?;

    let stats = index.stats();
    println!(
        "eagerly built {} tiles ({} features, {} points)",
        stats.tile_count, stats.total_features, stats.total_points
    );

    // walk down towards Berlin
    for z in [0u8, 4, 8, 12] {
        let n = (1u64 << z) as f64;
        let x = ((13.38 / 360.0 + 0.5) * n) as u32;
        let sin = (52.51f64).to_radians().sin();
        let y = ((0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / std::f64::consts::PI) * n) as u32;

        match index.get_tile(z, x, y) {
            Some(tile) => {
                println!("z{z} {x}/{y}: {} features", tile.features.len());
                for feature in &tile.features {
                    let name = feature
                        .tags
                        .as_ref()
                        .and_then(|tags| tags.get("name"))
                        .and_then(|v| v.as_str())
                        .unwrap_or("<unnamed>");
                    let points = match &feature.geometry {
                        TileGeometry::Points(points) => points.len(),
                        TileGeometry::Lines(rings) | TileGeometry::Polygons(rings) => {
                            rings.iter().map(|r| r.len()).sum()
                        }
                    };
                    println!("    {name}: {points} points");
                }
            }
            None => println!("z{z} {x}/{y}: empty"),
        }
    }

    Ok(())
}
