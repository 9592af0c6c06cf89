//! Date-based option pricing against a market context.

use volsurf_core::types::Date;

use super::black_scholes::BlackScholesMerton;
use crate::market::{MarketContext, OptionType};

/// Prices a European option quoted by expiry date.
///
/// Implementors are pure functions of their arguments; the implied
/// volatility solver inverts them in `vol`.
pub trait OptionPricer {
    /// Theoretical price of one option.
    ///
    /// Returns NaN for inputs the model cannot price (e.g. non-positive spot).
    fn price(
        &self,
        option_type: OptionType,
        strike: f64,
        expiry: Date,
        spot: f64,
        vol: f64,
        market: &MarketContext,
    ) -> f64;
}

/// Black-Scholes-Merton pricer with the market's flat rate and dividend yield.
///
/// # Examples
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_models::{BsmPricer, MarketContext, OptionPricer, OptionType};
///
/// let market = MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01);
/// let expiry = Date::from_ymd(2025, 7, 18).unwrap();
///
/// let low = BsmPricer.price(OptionType::Call, 100.0, expiry, 105.0, 0.2, &market);
/// let high = BsmPricer.price(OptionType::Call, 100.0, expiry, 105.0, 0.4, &market);
/// assert!(high > low);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BsmPricer;

impl OptionPricer for BsmPricer {
    #[inline]
    fn price(
        &self,
        option_type: OptionType,
        strike: f64,
        expiry: Date,
        spot: f64,
        vol: f64,
        market: &MarketContext,
    ) -> f64 {
        price(option_type, strike, expiry, spot, vol, market)
    }
}

/// Black-Scholes-Merton price of a European option expiring on `expiry`.
///
/// Time to expiry is the market's day-count year fraction from the
/// valuation date. Expired options (T <= 0) are worth intrinsic value and
/// zero volatility gives the discounted forward intrinsic value.
///
/// # Examples
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_models::analytical::price;
/// use volsurf_models::{MarketContext, OptionType};
///
/// let market = MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01);
/// let expiry = Date::from_ymd(2025, 7, 18).unwrap();
///
/// let call = price(OptionType::Call, 100.0, expiry, 105.0, 0.3, &market);
/// assert!(call > 5.0);
/// ```
pub fn price(
    option_type: OptionType,
    strike: f64,
    expiry: Date,
    spot: f64,
    vol: f64,
    market: &MarketContext,
) -> f64 {
    if !(strike > 0.0) || !strike.is_finite() {
        return f64::NAN;
    }

    let t = market.time_to_expiry(expiry);
    if t <= 0.0 {
        return option_type.intrinsic(spot, strike);
    }

    if vol == 0.0 {
        let forward_spot = spot * market.dividend_factor(t);
        let discounted_strike = strike * market.discount_factor(t);
        return option_type.intrinsic(forward_spot, discounted_strike);
    }

    match BlackScholesMerton::new(spot, market.risk_free_rate, market.dividend_yield, vol) {
        Ok(model) => model.price(option_type, strike, t),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market() -> MarketContext {
        MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01)
    }

    fn expiry() -> Date {
        Date::from_ymd(2025, 7, 18).unwrap()
    }

    // ==========================================================
    // Date-based pricing tests
    // ==========================================================

    #[test]
    fn test_price_matches_model_with_year_fraction() {
        let m = market();
        let t = 47.0 / 365.0;
        let model = BlackScholesMerton::new(105.0, 0.03, 0.01, 0.45).unwrap();

        let direct = model.price_call(100.0, t);
        let dated = price(OptionType::Call, 100.0, expiry(), 105.0, 0.45, &m);
        assert_relative_eq!(direct, dated, epsilon = 1e-12);
    }

    #[test]
    fn test_price_expired_is_intrinsic() {
        let m = market();
        let past = Date::from_ymd(2025, 5, 16).unwrap();
        assert_eq!(price(OptionType::Call, 100.0, past, 105.0, 0.3, &m), 5.0);
        assert_eq!(price(OptionType::Put, 100.0, past, 105.0, 0.3, &m), 0.0);
        assert_eq!(price(OptionType::Put, 110.0, m.valuation_date, 105.0, 0.3, &m), 5.0);
    }

    #[test]
    fn test_price_zero_vol_is_forward_intrinsic() {
        let m = market();
        let t: f64 = 47.0 / 365.0;
        let expected = 105.0 * (-0.01 * t).exp() - 100.0 * (-0.03 * t).exp();
        let p = price(OptionType::Call, 100.0, expiry(), 105.0, 0.0, &m);
        assert_relative_eq!(p, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_price_invalid_inputs_are_nan() {
        let m = market();
        assert!(price(OptionType::Call, 0.0, expiry(), 105.0, 0.3, &m).is_nan());
        assert!(price(OptionType::Call, 100.0, expiry(), -1.0, 0.3, &m).is_nan());
        assert!(price(OptionType::Call, 100.0, expiry(), 105.0, -0.3, &m).is_nan());
        assert!(price(OptionType::Call, f64::NAN, expiry(), 105.0, 0.3, &m).is_nan());
    }

    #[test]
    fn test_bsm_pricer_delegates() {
        let m = market();
        assert_eq!(
            BsmPricer.price(OptionType::Put, 110.0, expiry(), 105.0, 0.4, &m),
            price(OptionType::Put, 110.0, expiry(), 105.0, 0.4, &m)
        );
    }

    // ==========================================================
    // Property-based tests
    // ==========================================================

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn option_type_strategy() -> impl Strategy<Value = OptionType> {
            prop_oneof![Just(OptionType::Call), Just(OptionType::Put)]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn test_price_strictly_increasing_in_vol(
                option_type in option_type_strategy(),
                vol in 0.1..1.5_f64,
                bump in 0.01..0.5_f64,
                strike in 80.0..120.0_f64,
                t in 0.25..2.0_f64,
            ) {
                let model_low = BlackScholesMerton::new(100.0, 0.03, 0.01, vol).unwrap();
                let model_high = BlackScholesMerton::new(100.0, 0.03, 0.01, vol + bump).unwrap();

                let low = model_low.price(option_type, strike, t);
                let high = model_high.price(option_type, strike, t);
                prop_assert!(high > low, "price({}) = {} <= price({}) = {}", vol + bump, high, vol, low);
                prop_assert!(model_low.vega(strike, t) > 0.0);
            }

            #[test]
            fn test_price_within_no_arbitrage_bounds(
                vol in 0.05..2.0_f64,
                strike in 50.0..150.0_f64,
                t in 0.01..3.0_f64,
            ) {
                let model = BlackScholesMerton::new(100.0, 0.03, 0.01, vol).unwrap();
                let call = model.price_call(strike, t);
                let lower = (100.0 * (-0.01 * t).exp() - strike * (-0.03 * t).exp()).max(0.0);
                let upper = 100.0 * (-0.01 * t).exp();
                prop_assert!(call >= lower - 1e-10);
                prop_assert!(call <= upper + 1e-10);
            }
        }
    }
}
