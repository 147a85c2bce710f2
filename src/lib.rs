//! On-the-fly GeoJSON vector tiling with simplification, clipping, and
//! viewport queries.
//!
//! A [`TileIndex`] slices a GeoJSON dataset into a quadtree of map
//! tiles: geometry is projected onto a unit square, ranked by
//! Douglas-Peucker importance, clipped into buffered tile squares and
//! served in pixel coordinates. Tiles beyond the eagerly indexed depth
//! are generated on demand, so zooming is effectively unbounded. A
//! companion [`RangeIndex`] answers viewport queries, and
//! [`RenderModePolicy`] decides when a viewport is too busy for
//! interactive vector rendering.
//!
//! ```rust
//! use tilery::{Config, TileIndexBuilder};
//!
//! let data: tilery::GeoJson = r#"{
//!     "type": "Feature",
//!     "properties": { "name": "museum" },
//!     "geometry": { "type": "Point", "coordinates": [10.0, 20.0] }
//! }"#
//! .parse()?;
//!
//! let mut index = TileIndexBuilder::new()
//!     .config(Config::default().with_max_zoom(6))
//!     .data(data)
//!     .build()?;
//!
//! let tile = index.get_tile(0, 0, 0).expect("root tile");
//! assert_eq!(tile.num_features, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod feature;
pub mod index;
pub mod query;
pub mod raster;
pub mod simplify;
pub mod tile;

mod clip;
mod project;
mod wrap;

pub use builder::TileIndexBuilder;
pub use config::Config;
pub use error::{Result, TileryError};

pub use feature::{Feature, Geometry, Ring, TilePoint};
pub use index::{TileCoord, TileIndex, TileIndexStats};
pub use query::{RangeIndex, RenderMode, RenderModePolicy};
pub use raster::TileRaster;
pub use tile::{Tile, TileFeature, TileGeometry};

pub use geo::Rect;
pub use geojson::{GeoJson, JsonObject};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, Result, TileIndex, TileIndexBuilder, TileryError};

    pub use crate::{RangeIndex, RenderMode, RenderModePolicy, TileRaster};

    pub use crate::{Tile, TileCoord, TileFeature, TileGeometry};

    pub use geo::Rect;
    pub use geojson::GeoJson;
}
