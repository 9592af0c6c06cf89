//! Option quotes and their persisted form.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use volsurf_core::types::Date;
use volsurf_models::OptionType;

use crate::error::{Result, SurfaceError};

/// One observed option quote.
///
/// Built through [`Quote::new`], which enforces `bid >= 0`, `ask >= bid`,
/// `strike > 0`, `spot > 0` and finiteness of every price. Immutable
/// afterwards.
///
/// # Example
///
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_engine::Quote;
/// use volsurf_models::OptionType;
///
/// let expiry = Date::from_ymd(2025, 7, 18).unwrap();
/// let quote = Quote::new(expiry, 100.0, OptionType::Call, 9.8, 10.2, 105.0).unwrap();
/// assert!((quote.mid() - 10.0).abs() < 1e-12);
///
/// assert!(Quote::new(expiry, 100.0, OptionType::Call, 10.2, 9.8, 105.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    expiry: Date,
    strike: f64,
    option_type: OptionType,
    bid: f64,
    ask: f64,
    spot: f64,
}

impl Quote {
    /// Creates a validated quote.
    ///
    /// # Errors
    /// `SurfaceError::InvalidQuote` when a price is not finite, the bid is
    /// negative, the ask is below the bid, or strike or spot is not positive.
    pub fn new(
        expiry: Date,
        strike: f64,
        option_type: OptionType,
        bid: f64,
        ask: f64,
        spot: f64,
    ) -> Result<Self> {
        let invalid = |reason: &str| {
            Err(SurfaceError::InvalidQuote(format!(
                "{} {} {} (bid={}, ask={}, spot={}): {}",
                expiry, strike, option_type, bid, ask, spot, reason
            )))
        };

        if ![strike, bid, ask, spot].iter().all(|v| v.is_finite()) {
            return invalid("prices must be finite");
        }
        if strike <= 0.0 {
            return invalid("strike must be positive");
        }
        if spot <= 0.0 {
            return invalid("spot must be positive");
        }
        if bid < 0.0 {
            return invalid("bid must be non-negative");
        }
        if ask < bid {
            return invalid("ask must not be below bid");
        }

        Ok(Self {
            expiry,
            strike,
            option_type,
            bid,
            ask,
            spot,
        })
    }

    /// Expiry date.
    #[inline]
    pub fn expiry(&self) -> Date {
        self.expiry
    }

    /// Strike price.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Call or put.
    #[inline]
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Best bid.
    #[inline]
    pub fn bid(&self) -> f64 {
        self.bid
    }

    /// Best ask.
    #[inline]
    pub fn ask(&self) -> f64 {
        self.ask
    }

    /// Underlying spot when the quote was taken.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Mid price `0.5 * (bid + ask)`.
    #[inline]
    pub fn mid(&self) -> f64 {
        0.5 * (self.bid + self.ask)
    }
}

impl AsRef<Quote> for Quote {
    fn as_ref(&self) -> &Quote {
        self
    }
}

/// A quote together with its stored implied volatility.
///
/// This is the persisted row, with CSV columns
/// `expiry,spot,strike,bid,ask,iv,type`. `iv` is empty when the quote has
/// not been solved (or could not be).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteRecord {
    /// The quote itself.
    pub quote: Quote,
    /// Stored implied volatility, if any.
    pub iv: Option<f64>,
}

impl QuoteRecord {
    /// Pairs a quote with an optional implied volatility.
    pub fn new(quote: Quote, iv: Option<f64>) -> Self {
        Self { quote, iv }
    }

    /// Stored implied volatility when it is usable (finite and positive).
    #[inline]
    pub fn usable_iv(&self) -> Option<f64> {
        self.iv.filter(|v| v.is_finite() && *v > 0.0)
    }
}

impl From<Quote> for QuoteRecord {
    fn from(quote: Quote) -> Self {
        Self { quote, iv: None }
    }
}

impl From<QuoteRecord> for Quote {
    fn from(record: QuoteRecord) -> Self {
        record.quote
    }
}

impl AsRef<Quote> for QuoteRecord {
    fn as_ref(&self) -> &Quote {
        &self.quote
    }
}

/// Flat on-disk layout; field order is the column order.
#[derive(Serialize, Deserialize)]
struct QuoteRow {
    expiry: String,
    spot: f64,
    strike: f64,
    bid: f64,
    ask: f64,
    iv: Option<f64>,
    #[serde(rename = "type")]
    option_type: OptionType,
}

impl Serialize for QuoteRecord {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let q = &self.quote;
        QuoteRow {
            expiry: q.expiry.to_string(),
            spot: q.spot,
            strike: q.strike,
            bid: q.bid,
            ask: q.ask,
            iv: self.iv,
            option_type: q.option_type,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QuoteRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let row = QuoteRow::deserialize(deserializer)?;
        let expiry = Date::parse(&row.expiry).map_err(de::Error::custom)?;
        let quote = Quote::new(
            expiry,
            row.strike,
            row.option_type,
            row.bid,
            row.ask,
            row.spot,
        )
        .map_err(de::Error::custom)?;
        Ok(QuoteRecord::new(quote, row.iv))
    }
}
