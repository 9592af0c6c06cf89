//! Brent-based implied volatility solver.

use volsurf_core::math::solvers::{BrentSolver, SolverConfig};
use volsurf_core::types::Date;

use super::{ImpliedVolConfig, ImpliedVolError};
use crate::analytical::{BsmPricer, OptionPricer};
use crate::market::{MarketContext, OptionType};

/// Implied volatility solver.
///
/// Inverts an [`OptionPricer`] against the bid/ask mid by Brent root
/// finding on `[vol_min, vol_max]`. Holds no mutable state, so one solver
/// can be shared freely across threads.
///
/// # Example
///
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_models::{ImpliedVolConfig, ImpliedVolSolver, MarketContext, OptionType};
///
/// let market = MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01);
/// let expiry = Date::from_ymd(2025, 7, 18).unwrap();
/// let solver = ImpliedVolSolver::new(ImpliedVolConfig::default());
///
/// let vol = solver.solve(OptionType::Call, 100.0, expiry, 105.0, 9.8, 10.2, &market);
/// assert!(vol.is_some());
///
/// // A mid below intrinsic value has no implied volatility
/// let none = solver.solve(OptionType::Call, 100.0, expiry, 105.0, 0.9, 1.1, &market);
/// assert!(none.is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ImpliedVolSolver<P: OptionPricer = BsmPricer> {
    config: ImpliedVolConfig,
    pricer: P,
}

impl ImpliedVolSolver<BsmPricer> {
    /// Creates a Black-Scholes-Merton implied volatility solver.
    pub fn new(config: ImpliedVolConfig) -> Self {
        Self {
            config,
            pricer: BsmPricer,
        }
    }
}

impl Default for ImpliedVolSolver<BsmPricer> {
    fn default() -> Self {
        Self::new(ImpliedVolConfig::default())
    }
}

impl<P: OptionPricer> ImpliedVolSolver<P> {
    /// Creates a solver that inverts a custom pricer.
    pub fn with_pricer(config: ImpliedVolConfig, pricer: P) -> Self {
        Self { config, pricer }
    }

    /// Returns the solver configuration.
    pub fn config(&self) -> &ImpliedVolConfig {
        &self.config
    }

    /// Implied volatility of one quote, or `None` when it cannot be found.
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        &self,
        option_type: OptionType,
        strike: f64,
        expiry: Date,
        spot: f64,
        bid: f64,
        ask: f64,
        market: &MarketContext,
    ) -> Option<f64> {
        self.try_solve(option_type, strike, expiry, spot, bid, ask, market)
            .ok()
    }

    /// Implied volatility of one quote, with the reason on failure.
    ///
    /// The target is the mid `0.5 * (bid + ask)`.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - Non-finite fields, non-positive strike or spot,
    ///   non-positive time to expiry, or an invalid configuration
    /// * `NoBracket` - The mid is not positive, or not above the price at
    ///   `vol_min` and at most the price at `vol_max`
    /// * `NonConvergence` - Iteration cap reached
    /// * `NumericalInstability` - The pricer returned NaN or infinity
    #[allow(clippy::too_many_arguments)]
    pub fn try_solve(
        &self,
        option_type: OptionType,
        strike: f64,
        expiry: Date,
        spot: f64,
        bid: f64,
        ask: f64,
        market: &MarketContext,
    ) -> Result<f64, ImpliedVolError> {
        self.config.validate()?;

        if !strike.is_finite() || !spot.is_finite() || !bid.is_finite() || !ask.is_finite() {
            return Err(ImpliedVolError::InvalidInput(format!(
                "non-finite quote: strike={}, spot={}, bid={}, ask={}",
                strike, spot, bid, ask
            )));
        }
        if strike <= 0.0 || spot <= 0.0 {
            return Err(ImpliedVolError::InvalidInput(format!(
                "strike and spot must be positive: strike={}, spot={}",
                strike, spot
            )));
        }

        let t = market.time_to_expiry(expiry);
        if t <= 0.0 {
            return Err(ImpliedVolError::InvalidInput(format!(
                "expiry {} is not after valuation date {}",
                expiry, market.valuation_date
            )));
        }

        let target = 0.5 * (bid + ask);
        let objective =
            |vol: f64| self.pricer.price(option_type, strike, expiry, spot, vol, market) - target;

        let low_price = objective(self.config.vol_min) + target;
        let high_price = objective(self.config.vol_max) + target;
        if !low_price.is_finite() || !high_price.is_finite() {
            return Err(ImpliedVolError::NumericalInstability(format!(
                "non-finite price at bracket ends: {} / {}",
                low_price, high_price
            )));
        }

        // Price is flat at vol_min once it underflows, so a root there is not identifiable
        let (f_low, f_high) = (low_price - target, high_price - target);
        if target <= 0.0 || f_low >= 0.0 || f_high < 0.0 {
            return Err(ImpliedVolError::NoBracket {
                target,
                low_price,
                high_price,
            });
        }

        let solver = BrentSolver::new(SolverConfig {
            tolerance: self.config.tolerance,
            max_iterations: self.config.max_iterations,
        });

        Ok(solver.find_root(objective, self.config.vol_min, self.config.vol_max)?)
    }
}
