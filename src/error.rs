//! Error types shared across the crate.

use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TileryError>;

/// Errors produced while configuring or building a tile index.
///
/// Per-feature problems in the input (unsupported or malformed geometry)
/// are never errors: they are logged and the feature is skipped, so a
/// single bad feature cannot abort a whole tiling pass.
#[derive(Debug, Error)]
pub enum TileryError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The builder was asked to build without any input data.
    #[error("no input data provided")]
    MissingData,
}
