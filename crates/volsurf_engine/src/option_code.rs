//! OCC-style option identifiers.
//!
//! `{ROOT}{YYMMDD}{C|P}{STRIKE * 1000}`, for example `TSLA250606C00050000`
//! is a TSLA call expiring 2025-06-06 with strike 50.

use std::fmt;
use std::str::FromStr;

use volsurf_core::types::Date;
use volsurf_models::OptionType;

use crate::error::{Result, SurfaceError};

/// Two-digit years below this pivot are in the 2000s, the rest in the 1900s.
const CENTURY_PIVOT: i32 = 69;

/// A parsed option identifier.
///
/// # Example
///
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_engine::OptionCode;
/// use volsurf_models::OptionType;
///
/// let code: OptionCode = "TSLA250606C00050000".parse().unwrap();
/// assert_eq!(code.ticker, "TSLA");
/// assert_eq!(code.expiry, Date::from_ymd(2025, 6, 6).unwrap());
/// assert_eq!(code.option_type, OptionType::Call);
/// assert_eq!(code.strike, 50.0);
/// assert_eq!(code.to_string(), "TSLA250606C00050000");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OptionCode {
    /// Underlying root symbol.
    pub ticker: String,
    /// Expiry date.
    pub expiry: Date,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: f64,
}

impl OptionCode {
    /// Parses an identifier.
    ///
    /// # Errors
    /// `SurfaceError::InvalidOptionCode` when the root is missing or not
    /// uppercase ASCII, the date is not six digits or not a calendar date,
    /// the type is not `C`/`P`, or the strike is not all digits.
    pub fn parse(code: &str) -> Result<Self> {
        let invalid = |reason: &str| SurfaceError::InvalidOptionCode {
            code: code.to_string(),
            reason: reason.to_string(),
        };

        let root_len = code.bytes().take_while(u8::is_ascii_uppercase).count();
        if root_len == 0 {
            return Err(invalid("missing root symbol"));
        }
        let (ticker, rest) = code.split_at(root_len);

        let date_digits = rest.get(..6).ok_or_else(|| invalid("missing expiry"))?;
        if !date_digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expiry must be six digits"));
        }
        let rest = &rest[6..];

        let option_type = match rest.as_bytes().first() {
            Some(b'C') => OptionType::Call,
            Some(b'P') => OptionType::Put,
            _ => return Err(invalid("expected C or P after expiry")),
        };
        let strike_digits = &rest[1..];
        if strike_digits.is_empty() || !strike_digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("strike must be digits"));
        }

        let expiry = parse_yymmdd(date_digits).ok_or_else(|| invalid("expiry is not a calendar date"))?;
        let strike = strike_digits
            .parse::<u64>()
            .map_err(|_| invalid("strike out of range"))? as f64
            / 1000.0;

        Ok(Self {
            ticker: ticker.to_string(),
            expiry,
            option_type,
            strike,
        })
    }
}

fn parse_yymmdd(digits: &str) -> Option<Date> {
    let yy: i32 = digits[0..2].parse().ok()?;
    let month: u32 = digits[2..4].parse().ok()?;
    let day: u32 = digits[4..6].parse().ok()?;
    let year = if yy < CENTURY_PIVOT { 2000 + yy } else { 1900 + yy };
    Date::from_ymd(year, month, day).ok()
}

impl FromStr for OptionCode {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self> {
        OptionCode::parse(s)
    }
}

impl fmt::Display for OptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:02}{:02}{:02}{}{:08}",
            self.ticker,
            self.expiry.year().rem_euclid(100),
            self.expiry.month(),
            self.expiry.day(),
            self.option_type,
            (self.strike * 1000.0).round() as u64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================
    // Parsing tests
    // ==========================================================

    #[test]
    fn test_parse_call() {
        let code = OptionCode::parse("TSLA250606C00050000").unwrap();
        assert_eq!(code.ticker, "TSLA");
        assert_eq!(code.expiry, Date::from_ymd(2025, 6, 6).unwrap());
        assert_eq!(code.option_type, OptionType::Call);
        assert_eq!(code.strike, 50.0);
    }

    #[test]
    fn test_parse_put_with_fractional_strike() {
        let code = OptionCode::parse("SPX250718P04512500").unwrap();
        assert_eq!(code.ticker, "SPX");
        assert_eq!(code.option_type, OptionType::Put);
        assert_eq!(code.strike, 4512.5);
    }

    #[test]
    fn test_strike_width_is_free() {
        assert_eq!(OptionCode::parse("A250606C5").unwrap().strike, 0.005);
        assert_eq!(OptionCode::parse("A250606C1234567890").unwrap().strike, 1_234_567.89);
    }

    #[test]
    fn test_century_pivot() {
        assert_eq!(OptionCode::parse("X680119C1000").unwrap().expiry.year(), 2068);
        assert_eq!(OptionCode::parse("X690117C1000").unwrap().expiry.year(), 1969);
    }

    #[test]
    fn test_from_str() {
        let code: OptionCode = "AAPL260116C00200000".parse().unwrap();
        assert_eq!(code.strike, 200.0);
    }

    // ==========================================================
    // Rejection tests
    // ==========================================================

    #[test]
    fn test_malformed_codes_rejected() {
        for bad in [
            "",
            "250606C00050000",
            "tsla250606C00050000",
            "TSLA2506C00050000",
            "TSLA250606X00050000",
            "TSLA250606C",
            "TSLA250606C0005000a",
            "TSLA250606C00050000 ",
            "TSLA25O606C00050000",
            "TSLA250606C99999999999999999999999",
        ] {
            assert!(
                matches!(
                    OptionCode::parse(bad),
                    Err(SurfaceError::InvalidOptionCode { .. })
                ),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_invalid_calendar_date_rejected() {
        let err = OptionCode::parse("TSLA250231C00050000").unwrap_err();
        match err {
            SurfaceError::InvalidOptionCode { code, reason } => {
                assert_eq!(code, "TSLA250231C00050000");
                assert!(reason.contains("calendar"));
            }
            other => panic!("Expected InvalidOptionCode, got {:?}", other),
        }
    }

    // ==========================================================
    // Display tests
    // ==========================================================

    #[test]
    fn test_display_round_trips_standard_width() {
        for s in ["TSLA250606C00050000", "SPX250718P04512500"] {
            assert_eq!(OptionCode::parse(s).unwrap().to_string(), s);
        }
    }
}
