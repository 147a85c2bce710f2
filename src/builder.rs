//! Builder for tile indexes.
//!
//! A thin layer over [`TileIndex::new`] for callers that assemble
//! configuration piecewise.

use crate::config::Config;
use crate::error::{Result, TileryError};
use crate::index::TileIndex;
use geojson::GeoJson;

/// Builder collecting configuration and input data for a [`TileIndex`].
#[derive(Debug)]
pub struct TileIndexBuilder {
    config: Config,
    data: Option<GeoJson>,
}

impl TileIndexBuilder {
    /// Create a builder with the default configuration and no data.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            data: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the finest zoom level detail is preserved on.
    pub fn max_zoom(mut self, max_zoom: u8) -> Self {
        self.config.max_zoom = max_zoom;
        self
    }

    /// Set the simplification tolerance in pixels.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the GeoJSON input to tile.
    pub fn data(mut self, data: GeoJson) -> Self {
        self.data = Some(data);
        self
    }

    /// Validate the configuration and build the index.
    pub fn build(self) -> Result<TileIndex> {
        let data = self.data.ok_or(TileryError::MissingData)?;
        TileIndex::new(&data, self.config)
    }
}

impl Default for TileIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}
