//! Tiling configuration.
//!
//! The configuration is designed to be easily serializable and loadable
//! from JSON or other formats while keeping complexity minimal. Every
//! field has a default, so partial documents deserialize cleanly.

use crate::error::{Result, TileryError};
use serde::{Deserialize, Serialize};

/// Highest zoom level the index will ever serve.
///
/// Beyond this the packed tile id would no longer fit the fixed layout,
/// so both configuration validation and `get_tile` enforce it.
pub(crate) const MAX_ZOOM_CEILING: u8 = 24;

/// Tiling configuration.
///
/// # Example
///
/// ```rust
/// use tilery::Config;
///
/// // Create default config
/// let config = Config::default();
/// assert_eq!(config.max_zoom, 14);
///
/// // Load from JSON; omitted fields take their defaults
/// let json = r#"{ "max_zoom": 10, "tolerance": 5.0 }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.extent, 4096);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Finest zoom level detail is preserved on (0-24)
    #[serde(default = "Config::default_max_zoom")]
    pub max_zoom: u8,

    /// Depth of the eagerly built portion of the tile tree
    #[serde(default = "Config::default_index_max_zoom")]
    pub index_max_zoom: u8,

    /// Per-tile point threshold below which eager splitting stops
    #[serde(default = "Config::default_index_max_points")]
    pub index_max_points: usize,

    /// Simplification tolerance in pixels (higher means simpler)
    #[serde(default = "Config::default_tolerance")]
    pub tolerance: f64,

    /// Tile coordinate space size in pixels
    #[serde(default = "Config::default_extent")]
    pub extent: u16,

    /// Overlap margin on each tile side, in extent units
    #[serde(default = "Config::default_buffer")]
    pub buffer: u16,
}

impl Config {
    const fn default_max_zoom() -> u8 {
        14
    }

    const fn default_index_max_zoom() -> u8 {
        5
    }

    const fn default_index_max_points() -> usize {
        100_000
    }

    const fn default_tolerance() -> f64 {
        3.0
    }

    const fn default_extent() -> u16 {
        4096
    }

    const fn default_buffer() -> u16 {
        64
    }

    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_index_max_zoom(mut self, index_max_zoom: u8) -> Self {
        self.index_max_zoom = index_max_zoom;
        self
    }

    pub fn with_index_max_points(mut self, index_max_points: usize) -> Self {
        self.index_max_points = index_max_points;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_extent(mut self, extent: u16) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_buffer(mut self, buffer: u16) -> Self {
        self.buffer = buffer;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.max_zoom > MAX_ZOOM_CEILING {
            return Err(TileryError::Config(format!(
                "max_zoom must be at most {MAX_ZOOM_CEILING}"
            )));
        }

        if self.index_max_zoom > self.max_zoom {
            return Err(TileryError::Config(
                "index_max_zoom must not exceed max_zoom".to_string(),
            ));
        }

        if self.extent == 0 {
            return Err(TileryError::Config(
                "extent must be greater than zero".to_string(),
            ));
        }

        if self.buffer >= self.extent {
            return Err(TileryError::Config(
                "buffer must be smaller than extent".to_string(),
            ));
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(TileryError::Config(
                "tolerance must be finite and non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_zoom: Self::default_max_zoom(),
            index_max_zoom: Self::default_index_max_zoom(),
            index_max_points: Self::default_index_max_points(),
            tolerance: Self::default_tolerance(),
            extent: Self::default_extent(),
            buffer: Self::default_buffer(),
        }
    }
}
