//! Numerical building blocks.
//!
//! - [`solvers`]: Bracketing root finders (implied volatility inversion)
//! - [`interpolators`]: Grid interpolation (volatility surfaces)

pub mod interpolators;
pub mod solvers;
