//! Analytical pricing formulas for European options.
//!
//! This module provides closed-form solutions for option pricing:
//! - Black-Scholes-Merton model with continuous dividend yield
//! - Vega for the monotonicity of price in volatility
//! - Date-based pricing against a [`MarketContext`](crate::MarketContext)
//!
//! ## Design Principles
//!
//! - **Generic over `T: Float`**: The model works for `f64` and `f32`
//! - **Numerical Stability**: Double precision normal CDF so prices stay
//!   monotone in volatility down to the solver tolerance

pub mod black_scholes;
pub mod distributions;
pub mod error;
pub mod pricer;

// Re-export main types at module level
pub use black_scholes::BlackScholesMerton;
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
pub use pricer::{price, BsmPricer, OptionPricer};
