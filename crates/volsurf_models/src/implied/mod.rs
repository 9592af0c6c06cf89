//! Implied volatility inversion.
//!
//! ## Components
//!
//! - [`ImpliedVolSolver`]: Brent root finding of `price(σ) - mid` on a
//!   fixed volatility bracket
//! - [`ImpliedVolConfig`]: Bracket, accuracy and iteration cap
//! - [`ImpliedVolError`]: Why a quote could not be inverted
//!
//! Failure to invert is an ordinary outcome for market quotes (stale
//! prices, mids below intrinsic), so [`ImpliedVolSolver::solve`] returns
//! `Option<f64>`; [`ImpliedVolSolver::try_solve`] keeps the reason.

mod config;
mod error;
mod solver;

// Re-export public types at module level
pub use config::ImpliedVolConfig;
pub use error::ImpliedVolError;
pub use solver::ImpliedVolSolver;
