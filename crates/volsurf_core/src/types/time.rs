//! Time types and Day Count Conventions for option expiries.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate
//! - `DayCountConvention`: Day count conventions for year fractions
//! - [`third_friday`]: The standard monthly option expiry date
//!
//! # Examples
//!
//! ```
//! use volsurf_core::types::time::{Date, DayCountConvention};
//!
//! let valuation = Date::from_ymd(2025, 6, 1).unwrap();
//! let expiry = Date::from_ymd(2025, 7, 18).unwrap();
//!
//! let t = DayCountConvention::Actual365Fixed.year_fraction_dates(valuation, expiry);
//! assert!((t - 47.0 / 365.0).abs() < 1e-12);
//! ```

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Type-safe date wrapper around chrono::NaiveDate.
///
/// Serialises as an ISO 8601 string (`YYYY-MM-DD`).
///
/// # Examples
///
/// ```
/// use volsurf_core::types::time::Date;
///
/// let date = Date::from_ymd(2025, 7, 18).unwrap();
/// assert_eq!(date.year(), 2025);
///
/// let parsed: Date = "2025-07-18".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// let start = Date::from_ymd(2025, 6, 1).unwrap();
/// assert_eq!(date - start, 47);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month, and day components.
    ///
    /// # Returns
    /// `Ok(Date)` if the date is valid, `Err(DateError::InvalidDate)` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use volsurf_core::types::time::Date;
    ///
    /// assert!(Date::from_ymd(2024, 2, 29).is_ok());
    /// assert!(Date::from_ymd(2025, 2, 29).is_err());
    /// ```
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Returns today's date based on local system time.
    pub fn today() -> Self {
        Date(Local::now().date_naive())
    }

    /// Parses a date from ISO 8601 format string (YYYY-MM-DD).
    ///
    /// A trailing time component (`2025-07-18T00:00:00`, `2025-07-18 00:00:00`)
    /// is accepted and ignored, since chain exports often carry midnight
    /// timestamps for expiry dates.
    ///
    /// # Examples
    ///
    /// ```
    /// use volsurf_core::types::time::Date;
    ///
    /// let date = Date::parse("2025-07-18").unwrap();
    /// assert_eq!(date.day(), 18);
    ///
    /// let stamped = Date::parse("2025-07-18T00:00:00").unwrap();
    /// assert_eq!(date, stamped);
    ///
    /// assert!(Date::parse("not-a-date").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, DateError> {
        let s = s.trim();
        let day_part = s.split(['T', ' ']).next().unwrap_or(s);
        NaiveDate::parse_from_str(day_part, "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(format!("{}: {}", s, e)))
    }

    /// Returns the underlying NaiveDate.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns the day of the week.
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Returns the date shifted by a signed number of calendar days.
    ///
    /// Returns `None` if the result falls outside chrono's supported range.
    ///
    /// # Examples
    ///
    /// ```
    /// use volsurf_core::types::time::Date;
    ///
    /// let date = Date::from_ymd(2025, 6, 30).unwrap();
    /// assert_eq!(date.add_days(1), Some(Date::from_ymd(2025, 7, 1).unwrap()));
    /// assert_eq!(date.add_days(-30), Some(Date::from_ymd(2025, 5, 31).unwrap()));
    /// ```
    pub fn add_days(self, days: i64) -> Option<Self> {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        shifted.map(Date)
    }

    /// Returns true if this date is the third Friday of its month.
    ///
    /// # Examples
    ///
    /// ```
    /// use volsurf_core::types::time::Date;
    ///
    /// assert!(Date::from_ymd(2025, 6, 20).unwrap().is_third_friday());
    /// assert!(!Date::from_ymd(2025, 6, 13).unwrap().is_third_friday());
    /// ```
    pub fn is_third_friday(&self) -> bool {
        third_friday(self.year(), self.month()).is_some_and(|d| d == *self)
    }
}

/// Returns the third Friday of the given month.
///
/// The standard monthly option expiry falls on the third occurrence of a
/// Friday in the calendar month. Returns `None` for an invalid month.
///
/// # Examples
///
/// ```
/// use volsurf_core::types::time::{third_friday, Date};
///
/// assert_eq!(third_friday(2025, 7), Some(Date::from_ymd(2025, 7, 18).unwrap()));
/// assert_eq!(third_friday(2025, 13), None);
/// ```
pub fn third_friday(year: i32, month: u32) -> Option<Date> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Fri, 3).map(Date)
}

impl Sub for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    ///
    /// The result is positive if `self` is after `other`, negative otherwise.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    /// Formats the date as ISO 8601 (YYYY-MM-DD).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

/// Day Count Convention (year fraction convention).
///
/// # Variants
/// - `Actual365Fixed`: Actual days / 365 (equity option convention, the default)
/// - `Actual360`: Actual days / 360
/// - `Thirty360`: 30/360 US bond basis
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DayCountConvention {
    /// Actual/365 Fixed: actual_days / 365.0
    #[default]
    Actual365Fixed,

    /// Actual/360: actual_days / 360.0
    Actual360,

    /// 30/360 US Bond Basis
    Thirty360,
}

impl DayCountConvention {
    /// Returns the standard convention name.
    ///
    /// # Examples
    ///
    /// ```
    /// use volsurf_core::types::time::DayCountConvention;
    ///
    /// assert_eq!(DayCountConvention::Actual365Fixed.name(), "ACT/365");
    /// assert_eq!(DayCountConvention::Thirty360.name(), "30/360");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Actual365Fixed => "ACT/365",
            DayCountConvention::Actual360 => "ACT/360",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Calculates the year fraction between two dates.
    ///
    /// Returns a negative value when `start > end` instead of panicking,
    /// so dates before the valuation date map to negative times.
    ///
    /// # Examples
    ///
    /// ```
    /// use volsurf_core::types::time::{Date, DayCountConvention};
    ///
    /// let start = Date::from_ymd(2024, 1, 1).unwrap();
    /// let end = Date::from_ymd(2024, 7, 1).unwrap();
    ///
    /// let yf = DayCountConvention::Actual365Fixed.year_fraction_dates(start, end);
    /// assert!((yf - 182.0 / 365.0).abs() < 1e-12);
    ///
    /// let yf_neg = DayCountConvention::Actual365Fixed.year_fraction_dates(end, start);
    /// assert!((yf_neg + yf).abs() < 1e-12);
    /// ```
    pub fn year_fraction_dates(&self, start: Date, end: Date) -> f64 {
        let days = end - start;

        match self {
            DayCountConvention::Actual365Fixed => days as f64 / 365.0,
            DayCountConvention::Actual360 => days as f64 / 360.0,
            DayCountConvention::Thirty360 => {
                let (from, to, sign) = if start <= end {
                    (start.into_inner(), end.into_inner(), 1.0)
                } else {
                    (end.into_inner(), start.into_inner(), -1.0)
                };

                let d1 = if from.day() == 31 { 30 } else { from.day() };
                let d2 = if to.day() == 31 && d1 == 30 {
                    30
                } else {
                    to.day()
                };

                let days_30_360 = 360 * (to.year() - from.year())
                    + 30 * (to.month() as i32 - from.month() as i32)
                    + (d2 as i32 - d1 as i32);
                sign * days_30_360 as f64 / 360.0
            }
        }
    }
}

impl FromStr for DayCountConvention {
    type Err = String;

    /// Parses day count convention from string (case-insensitive).
    ///
    /// - ACT/365: "ACT/365", "Actual/365", "ACT/365F", "Actual365Fixed", "A365"
    /// - ACT/360: "ACT/360", "Actual/360", "A360"
    /// - 30/360: "30/360", "Thirty360"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['/', ' ', '_', '-'], "").as_str() {
            "ACT365" | "ACTUAL365" | "ACT365F" | "ACTUAL365FIXED" | "A365" => {
                Ok(DayCountConvention::Actual365Fixed)
            }
            "ACT360" | "ACTUAL360" | "A360" => Ok(DayCountConvention::Actual360),
            "30360" | "THIRTY360" => Ok(DayCountConvention::Thirty360),
            _ => Err(format!("Unknown day count convention: {}", s)),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::DayCountConvention;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    impl Serialize for DayCountConvention {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for DayCountConvention {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            DayCountConvention::from_str(&s).map_err(de::Error::custom)
        }
    }
}
