//! # volsurf_core: Foundation for the Volatility Surface Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! volsurf_core is the bottom layer of the workspace, providing:
//! - Time types: `Date`, `DayCountConvention` and the third-Friday
//!   expiry calendar (`types::time`)
//! - Error types: `DateError`, `InterpolationError`, `SolverError` (`types::error`)
//! - Bracketing root finder: `BrentSolver` (`math::solvers`)
//! - Grid interpolation: `BilinearInterpolator` (`math::interpolators`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other volsurf_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - chrono: Date arithmetic
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use volsurf_core::types::{Date, DayCountConvention};
//!
//! let start = Date::from_ymd(2025, 6, 1).unwrap();
//! let end = Date::from_ymd(2025, 7, 18).unwrap();
//! let year_fraction = DayCountConvention::Actual365Fixed.year_fraction_dates(start, end);
//! assert!((year_fraction - 47.0 / 365.0).abs() < 1e-12);
//!
//! // 2025-07-18 is the third Friday of July 2025
//! assert!(end.is_third_friday());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for `Date`, `DayCountConvention`
//!   and the error types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
