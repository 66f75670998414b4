//! Library side of the `terrashade` CLI.
//!
//! Holds the run configuration, solar position and the pipeline steps the
//! binary strings together, so they can be tested and reused.

pub mod config;
mod error;
pub mod pipeline;
pub mod solar;

pub use config::RunnerConfig;
pub use error::RunnerError;

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
