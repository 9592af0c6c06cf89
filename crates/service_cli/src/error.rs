//! CLI error types.

use thiserror::Error;
use volsurf_core::types::DateError;
use volsurf_engine::SurfaceError;

use crate::config::ConfigError;

/// Convenience alias for command results.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by the `volsurf` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Invalid date: {0}")]
    Date(#[from] DateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No quotes selected: {0}")]
    NoQuotes(String),
}
