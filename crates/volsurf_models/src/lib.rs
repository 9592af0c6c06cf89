//! # volsurf_models (Layer 2: Models)
//!
//! Option pricing and implied volatility inversion.
//!
//! This crate provides:
//! - Market description: [`OptionType`] and [`MarketContext`] (valuation
//!   date, flat rate, flat dividend yield, day count)
//! - Black-Scholes-Merton closed form with continuous dividend yield
//!   ([`analytical`])
//! - Bracketed implied volatility inversion against the bid/ask mid
//!   ([`implied`])
//!
//! ## Design Principles
//!
//! - **Explicit market context**: every pricing call receives the valuation
//!   date; there is no process-wide evaluation date
//! - **Failures as values**: an unsolvable quote is `None`, not a panic
//!
//! ## Example
//!
//! ```
//! use volsurf_core::types::Date;
//! use volsurf_models::{ImpliedVolConfig, ImpliedVolSolver, MarketContext, OptionType};
//!
//! let market = MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01);
//! let expiry = Date::from_ymd(2025, 7, 18).unwrap();
//!
//! let solver = ImpliedVolSolver::new(ImpliedVolConfig::default());
//! let vol = solver
//!     .solve(OptionType::Call, 110.0, expiry, 105.0, 4.5, 4.9, &market)
//!     .unwrap();
//! assert!(vol > 1e-4 && vol < 5.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod implied;
pub mod market;

pub use analytical::{AnalyticalError, BlackScholesMerton, BsmPricer, OptionPricer};
pub use implied::{ImpliedVolConfig, ImpliedVolError, ImpliedVolSolver};
pub use market::{MarketContext, OptionType};
