//! Error types for shadow rendering.

use thiserror::Error;

/// Errors that can occur when setting up or exporting a render.
#[derive(Debug, Error)]
pub enum ShadowError {
    /// The sun vector or observer height is not usable.
    #[error("Invalid shadow parameters: {0}")]
    InvalidParams(String),

    /// An illumination grid does not match the grid it is exported against.
    #[error("Illumination grid has {actual} cells per side, grid has {expected}")]
    SizeMismatch {
        /// Cells per side of the projected grid.
        expected: usize,
        /// Cells per side of the illumination grid.
        actual: usize,
    },

    /// Error from the underlying grid.
    #[error(transparent)]
    Grid(#[from] terrashade_grid::GridError),

    /// Image encoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error writing an output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parameters or GeoJSON could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
