//! Error types for the runner.

use thiserror::Error;

/// Errors that can occur while running a pipeline command.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration is incomplete or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A timestamp could not be parsed.
    #[error("Invalid time '{0}', expected 'YYYY-MM-DD HH:MM' or RFC 3339")]
    InvalidTime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Elevation data error.
    #[error(transparent)]
    Dem(#[from] terrashade_dem::DemError),

    /// Grid or height map error.
    #[error(transparent)]
    Grid(#[from] terrashade_grid::GridError),

    /// Rendering or export error.
    #[error(transparent)]
    Shadow(#[from] terrashade_shadow::ShadowError),

    /// The interrupt handler could not be installed.
    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}
