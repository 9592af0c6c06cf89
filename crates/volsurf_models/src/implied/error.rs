//! Implied volatility error types.

use thiserror::Error;
use volsurf_core::types::SolverError;

/// Reasons an implied volatility cannot be found.
///
/// # Variants
/// - `NoBracket`: The mid price is not attained inside the volatility bracket
/// - `NonConvergence`: The iteration cap was reached
/// - `NumericalInstability`: The pricer produced a non-finite value
/// - `InvalidInput`: Non-finite quote fields, non-positive strike or spot,
///   an expired option, or an unusable configuration
///
/// # Examples
/// ```
/// use volsurf_models::ImpliedVolError;
///
/// let err = ImpliedVolError::NonConvergence { iterations: 100 };
/// assert!(err.to_string().contains("100"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ImpliedVolError {
    /// Target price lies outside the prices spanned by the bracket.
    #[error("Target price {target} not bracketed by prices [{low_price}, {high_price}]")]
    NoBracket {
        /// Mid price being inverted
        target: f64,
        /// Model price at the lower volatility bound
        low_price: f64,
        /// Model price at the upper volatility bound
        high_price: f64,
    },

    /// Solver did not converge within the iteration cap.
    #[error("Implied volatility did not converge after {iterations} iterations")]
    NonConvergence {
        /// Number of iterations performed
        iterations: usize,
    },

    /// Non-finite value during root finding.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Inputs that cannot be inverted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<SolverError> for ImpliedVolError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::MaxIterationsExceeded { iterations } => {
                ImpliedVolError::NonConvergence { iterations }
            }
            SolverError::NumericalInstability(message) => {
                ImpliedVolError::NumericalInstability(message)
            }
            // The bracket is checked before the solver runs, so this only
            // surfaces if the objective changes between evaluations.
            SolverError::NoBracket { a, b } => ImpliedVolError::NumericalInstability(format!(
                "objective lost its sign change on [{}, {}]",
                a, b
            )),
        }
    }
}
