//! Core time and error types.
//!
//! This module provides:
//! - `time`: Time types (Date, DayCountConvention) and the standard monthly
//!   expiry calendar
//! - `error`: Structured error types for date, interpolation, and solver operations
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`Date`], [`DayCountConvention`], [`third_friday`] from `time`
//! - [`DateError`], [`InterpolationError`], [`SolverError`] from `error`

pub mod error;
pub mod time;

// Re-export commonly used types at module level
pub use error::{DateError, InterpolationError, SolverError};
pub use time::{third_friday, Date, DayCountConvention};
