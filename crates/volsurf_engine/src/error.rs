//! Error types for surface construction.

use thiserror::Error;
use volsurf_core::types::{DateError, InterpolationError};

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Errors raised while building, querying or persisting a surface.
///
/// A quote whose implied volatility cannot be solved is not an error: the
/// grid cell stays missing and the fill policy repairs it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SurfaceError {
    /// No grid cell could be observed, so there is nothing to fill from.
    #[error("Empty grid: no quote produced an implied volatility")]
    EmptyGrid,

    /// The sampler needs at least two time points.
    #[error("Insufficient sample points: got {got}, need at least 2")]
    InsufficientSamplePoints {
        /// Requested number of points
        got: usize,
    },

    /// A quote violates its invariants (e.g. ask below bid).
    #[error("Invalid quote: {0}")]
    InvalidQuote(String),

    /// Grid axes or cells are inconsistent with what the operation needs.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// An option identifier does not follow `ROOT YYMMDD C|P STRIKE*1000`.
    #[error("Invalid option code '{code}': {reason}")]
    InvalidOptionCode {
        /// The offending identifier
        code: String,
        /// What was wrong with it
        reason: String,
    },

    /// Interpolator construction failed.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Reading or writing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialising a sample to JSON failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A date could not be built or parsed.
    #[error("Date error: {0}")]
    Date(#[from] DateError),
}
