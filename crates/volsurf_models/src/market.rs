//! Option type and market context shared by pricing and inversion.

use std::fmt;
use std::str::FromStr;

use volsurf_core::types::{Date, DayCountConvention};

/// Option type (Call or Put).
///
/// Text form is `C` / `P`; parsing also accepts `Call` / `Put`
/// case-insensitively.
///
/// # Examples
/// ```
/// use volsurf_models::OptionType;
///
/// assert_eq!("C".parse::<OptionType>().unwrap(), OptionType::Call);
/// assert_eq!("put".parse::<OptionType>().unwrap(), OptionType::Put);
/// assert_eq!(OptionType::Call.to_string(), "C");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Right to buy the underlying at the strike.
    Call,
    /// Right to sell the underlying at the strike.
    Put,
}

impl OptionType {
    /// Returns whether this is a call option.
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, OptionType::Call)
    }

    /// Returns whether this is a put option.
    #[inline]
    pub fn is_put(&self) -> bool {
        matches!(self, OptionType::Put)
    }

    /// Single-letter code used in option identifiers and CSV files.
    #[inline]
    pub fn code(&self) -> char {
        match self {
            OptionType::Call => 'C',
            OptionType::Put => 'P',
        }
    }

    /// Payoff at expiry for the given spot and strike.
    #[inline]
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" | "CALL" => Ok(OptionType::Call),
            "P" | "PUT" => Ok(OptionType::Put),
            _ => Err(format!("Unknown option type: {}", s)),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::OptionType;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for OptionType {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for OptionType {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        }
    }
}

/// Market inputs for pricing a set of quotes on one valuation date.
///
/// Rates are flat and continuously compounded. Passed explicitly to every
/// pricing and solving call.
///
/// # Examples
/// ```
/// use volsurf_core::types::{Date, DayCountConvention};
/// use volsurf_models::MarketContext;
///
/// let market = MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01);
/// assert_eq!(market.day_count, DayCountConvention::Actual365Fixed);
///
/// let t = market.time_to_expiry(Date::from_ymd(2025, 7, 18).unwrap());
/// assert!((t - 47.0 / 365.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketContext {
    /// Date on which quotes are observed.
    pub valuation_date: Date,
    /// Flat continuously compounded risk-free rate.
    pub risk_free_rate: f64,
    /// Flat continuous dividend yield.
    pub dividend_yield: f64,
    /// Convention used to turn date differences into year fractions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub day_count: DayCountConvention,
}

impl MarketContext {
    /// Creates a market context with the Actual/365 Fixed day count.
    pub fn new(valuation_date: Date, risk_free_rate: f64, dividend_yield: f64) -> Self {
        Self {
            valuation_date,
            risk_free_rate,
            dividend_yield,
            day_count: DayCountConvention::default(),
        }
    }

    /// Returns a copy using a different day count convention.
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Year fraction from the valuation date to `date`.
    ///
    /// Negative for dates before the valuation date.
    #[inline]
    pub fn time_to_expiry(&self, date: Date) -> f64 {
        self.day_count.year_fraction_dates(self.valuation_date, date)
    }

    /// Discount factor `exp(-r t)`.
    #[inline]
    pub fn discount_factor(&self, t: f64) -> f64 {
        (-self.risk_free_rate * t).exp()
    }

    /// Dividend discount factor `exp(-q t)`.
    #[inline]
    pub fn dividend_factor(&self, t: f64) -> f64 {
        (-self.dividend_yield * t).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    // ==========================================================
    // OptionType tests
    // ==========================================================

    #[test]
    fn test_option_type_parse_codes() {
        assert_eq!("C".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!("P".parse::<OptionType>().unwrap(), OptionType::Put);
        assert_eq!("c".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!(" p ".parse::<OptionType>().unwrap(), OptionType::Put);
    }

    #[test]
    fn test_option_type_parse_words() {
        assert_eq!("Call".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!("PUT".parse::<OptionType>().unwrap(), OptionType::Put);
    }

    #[test]
    fn test_option_type_parse_invalid() {
        let err = "X".parse::<OptionType>().unwrap_err();
        assert!(err.contains("Unknown option type"));
        assert!("".parse::<OptionType>().is_err());
    }

    #[test]
    fn test_option_type_display() {
        assert_eq!(OptionType::Call.to_string(), "C");
        assert_eq!(OptionType::Put.to_string(), "P");
    }

    #[test]
    fn test_option_type_predicates() {
        assert!(OptionType::Call.is_call());
        assert!(!OptionType::Call.is_put());
        assert!(OptionType::Put.is_put());
    }

    #[test]
    fn test_intrinsic() {
        assert_eq!(OptionType::Call.intrinsic(105.0, 100.0), 5.0);
        assert_eq!(OptionType::Call.intrinsic(95.0, 100.0), 0.0);
        assert_eq!(OptionType::Put.intrinsic(95.0, 100.0), 5.0);
        assert_eq!(OptionType::Put.intrinsic(105.0, 100.0), 0.0);
    }

    // ==========================================================
    // MarketContext tests
    // ==========================================================

    #[test]
    fn test_time_to_expiry_act365() {
        let market = MarketContext::new(date(2025, 6, 1), 0.03, 0.01);
        let t = market.time_to_expiry(date(2025, 7, 18));
        assert!((t - 47.0 / 365.0).abs() < 1e-12);
    }

    #[test]
    fn test_time_to_expiry_negative_before_valuation() {
        let market = MarketContext::new(date(2025, 6, 1), 0.03, 0.01);
        assert!(market.time_to_expiry(date(2025, 5, 1)) < 0.0);
        assert_eq!(market.time_to_expiry(date(2025, 6, 1)), 0.0);
    }

    #[test]
    fn test_with_day_count() {
        let market = MarketContext::new(date(2025, 6, 1), 0.03, 0.01)
            .with_day_count(DayCountConvention::Actual360);
        let t = market.time_to_expiry(date(2025, 7, 18));
        assert!((t - 47.0 / 360.0).abs() < 1e-12);
    }

    #[test]
    fn test_discount_factors() {
        let market = MarketContext::new(date(2025, 6, 1), 0.05, 0.02);
        assert!((market.discount_factor(1.0) - (-0.05_f64).exp()).abs() < 1e-15);
        assert!((market.dividend_factor(2.0) - (-0.04_f64).exp()).abs() < 1e-15);
    }
}
