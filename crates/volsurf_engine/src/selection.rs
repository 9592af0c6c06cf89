//! Near-the-money selection on standard monthly expiries.

use tracing::{debug, warn};
use volsurf_core::types::Date;

use crate::quote::Quote;

/// Default number of strikes kept per expiry.
pub const DEFAULT_ATM_COUNT: usize = 10;

/// Keeps the calls closest to the money on each upcoming monthly expiry.
///
/// A quote survives when it is a call and its expiry is a third Friday on
/// or after `valuation_date`. Within each expiry quotes are ranked by
/// `|strike - spot|` (ties keep input order) and the first `count` are
/// kept. The result is ordered by expiry, then by distance from the money.
///
/// Every upcoming monthly expiry is kept, not only the nearest one, so the
/// selection spans the term structure the surface is built over.
///
/// Returns an empty vector when no upcoming monthly expiry is quoted.
///
/// # Example
///
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_engine::{select_near_atm, Quote};
/// use volsurf_models::OptionType;
///
/// let monthly = Date::from_ymd(2025, 7, 18).unwrap();
/// let weekly = Date::from_ymd(2025, 7, 11).unwrap();
/// let quotes = vec![
///     Quote::new(monthly, 90.0, OptionType::Call, 15.0, 15.5, 105.0).unwrap(),
///     Quote::new(monthly, 105.0, OptionType::Call, 4.0, 4.4, 105.0).unwrap(),
///     Quote::new(weekly, 105.0, OptionType::Call, 2.0, 2.2, 105.0).unwrap(),
///     Quote::new(monthly, 105.0, OptionType::Put, 3.0, 3.3, 105.0).unwrap(),
/// ];
///
/// let valuation = Date::from_ymd(2025, 6, 1).unwrap();
/// let near = select_near_atm(&quotes, valuation, 1);
/// assert_eq!(near.len(), 1);
/// assert_eq!(near[0].strike(), 105.0);
/// ```
pub fn select_near_atm<Q>(quotes: &[Q], valuation_date: Date, count: usize) -> Vec<Q>
where
    Q: AsRef<Quote> + Clone,
{
    let mut candidates: Vec<&Q> = quotes
        .iter()
        .filter(|q| {
            let q = q.as_ref();
            q.option_type().is_call()
                && q.expiry() >= valuation_date
                && q.expiry().is_third_friday()
        })
        .collect();

    if candidates.is_empty() {
        warn!(
            valuation_date = %valuation_date,
            "No call quotes on an upcoming third-Friday expiry"
        );
        return Vec::new();
    }

    // Stable: equal distances keep input order
    candidates.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());
        a.expiry()
            .cmp(&b.expiry())
            .then_with(|| atm_distance(a).total_cmp(&atm_distance(b)))
    });

    let mut selected = Vec::new();
    let mut current: Option<(Date, usize)> = None;
    for q in candidates {
        let expiry = q.as_ref().expiry();
        let taken = match current {
            Some((e, n)) if e == expiry => n,
            _ => 0,
        };
        if taken < count {
            selected.push(q.clone());
        }
        current = Some((expiry, taken + 1));
    }

    debug!(
        input = quotes.len(),
        selected = selected.len(),
        count,
        "Selected near-the-money quotes"
    );
    selected
}

#[inline]
fn atm_distance(q: &Quote) -> f64 {
    (q.strike() - q.spot()).abs()
}
