//! Error types for projected grids.

use thiserror::Error;

/// Errors that can occur when building or persisting grids.
#[derive(Debug, Error)]
pub enum GridError {
    /// Grid parameters are unusable.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// The projection produced non-finite coordinates.
    #[error("Projection error: {0}")]
    Projection(String),

    /// Elevation data does not fit the grid.
    #[error("Expected {expected} elevation samples, got {actual}")]
    SizeMismatch {
        /// Samples required by the grid (size squared).
        expected: usize,
        /// Samples supplied.
        actual: usize,
    },

    /// I/O error reading or writing persisted state.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
