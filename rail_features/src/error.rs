//! Error types for pipeline operations.
//!
//! Only schema-level and I/O problems are errors. Row-level problems
//! (unparseable keys, missing coordinates, degenerate denominators) are
//! recovered locally and counted in the run report instead.

use polars::prelude::PolarsError;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("DataFrame error: {0}")]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<String> for PipelineError {
    fn from(s: String) -> Self {
        PipelineError::InvalidInput(s)
    }
}

impl From<&str> for PipelineError {
    fn from(s: &str) -> Self {
        PipelineError::InvalidInput(s.to_string())
    }
}
