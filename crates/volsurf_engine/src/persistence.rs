//! CSV persistence of quotes and raw option chains.
//!
//! Quote files carry the header `expiry,spot,strike,bid,ask,iv,type`, one
//! [`QuoteRecord`] per row, with an empty `iv` when the quote is unsolved.
//!
//! Raw chain files are exchange dumps with at least `option,bid,ask,spot`
//! columns, where `option` is an OCC-style code (see
//! [`crate::option_code`]). Other columns are ignored.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};
use volsurf_models::{BsmPricer, ImpliedVolConfig, ImpliedVolSolver, MarketContext, OptionPricer};

use crate::error::Result;
use crate::option_code::OptionCode;
use crate::quote::{Quote, QuoteRecord};

/// Reads quote records from CSV.
///
/// # Errors
/// `SurfaceError::Csv` for malformed rows, including rows that violate
/// the quote invariants.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<QuoteRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<QuoteRecord>, csv::Error>>()?;
    debug!(rows = records.len(), "Read quote records");
    Ok(records)
}

/// Reads quote records from a CSV file.
///
/// # Errors
/// `SurfaceError::Io` if the file cannot be opened, otherwise as
/// [`read_records`].
pub fn read_records_path<P: AsRef<Path>>(path: P) -> Result<Vec<QuoteRecord>> {
    read_records(File::open(path)?)
}

/// Writes quote records as CSV with a header row.
///
/// # Errors
/// `SurfaceError::Csv` or `SurfaceError::Io` on write failure.
pub fn write_records<W: Write>(writer: W, records: &[QuoteRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(["expiry", "spot", "strike", "bid", "ask", "iv", "type"])?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes quote records to a CSV file, replacing it.
///
/// # Errors
/// As [`write_records`], plus `SurfaceError::Io` if the file cannot be
/// created.
pub fn write_records_path<P: AsRef<Path>>(path: P, records: &[QuoteRecord]) -> Result<()> {
    write_records(File::create(path)?, records)
}

#[derive(Debug, Deserialize)]
struct ChainRow {
    option: String,
    bid: f64,
    ask: f64,
    spot: f64,
    #[serde(default)]
    iv: Option<f64>,
}

/// Reads a raw option chain, decoding each option code.
///
/// Rows whose prices violate the quote invariants are skipped with a
/// warning; an exchange `iv` of zero or below is treated as absent.
///
/// # Errors
/// * `SurfaceError::Csv` - Unreadable CSV or missing columns
/// * `SurfaceError::InvalidOptionCode` - An `option` cell is malformed
pub fn read_chain<R: Read>(reader: R) -> Result<Vec<QuoteRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in rdr.deserialize::<ChainRow>() {
        let row = row?;
        let code = OptionCode::parse(&row.option)?;
        match Quote::new(
            code.expiry,
            code.strike,
            code.option_type,
            row.bid,
            row.ask,
            row.spot,
        ) {
            Ok(quote) => {
                let iv = row.iv.filter(|v| *v > 0.0);
                records.push(QuoteRecord::new(quote, iv));
            }
            Err(e) => {
                skipped += 1;
                warn!(option = %row.option, error = %e, "Skipping chain row");
            }
        }
    }

    debug!(rows = records.len(), skipped, "Read option chain");
    Ok(records)
}

/// Reads a raw option chain from a file.
///
/// # Errors
/// `SurfaceError::Io` if the file cannot be opened, otherwise as
/// [`read_chain`].
pub fn read_chain_path<P: AsRef<Path>>(path: P) -> Result<Vec<QuoteRecord>> {
    read_chain(File::open(path)?)
}

/// Solves each quote's implied volatility for storage.
///
/// Unsolvable quotes get `iv = None`.
///
/// # Example
///
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_engine::{persistence, Quote};
/// use volsurf_models::{MarketContext, OptionType};
///
/// let market = MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01);
/// let expiry = Date::from_ymd(2025, 7, 18).unwrap();
/// let quotes = vec![
///     Quote::new(expiry, 100.0, OptionType::Call, 9.8, 10.2, 105.0).unwrap(),
///     Quote::new(expiry, 100.0, OptionType::Call, 0.0, 0.1, 105.0).unwrap(),
/// ];
///
/// let records = persistence::annotate(&quotes, &market);
/// assert!(records[0].iv.is_some());
/// assert!(records[1].iv.is_none());
/// ```
pub fn annotate<Q: AsRef<Quote>>(quotes: &[Q], market: &MarketContext) -> Vec<QuoteRecord> {
    let solver: ImpliedVolSolver<BsmPricer> = ImpliedVolSolver::new(ImpliedVolConfig::default());
    annotate_with(quotes, market, &solver)
}

/// Solves each quote's implied volatility with an explicit solver.
pub fn annotate_with<Q, P>(
    quotes: &[Q],
    market: &MarketContext,
    solver: &ImpliedVolSolver<P>,
) -> Vec<QuoteRecord>
where
    Q: AsRef<Quote>,
    P: OptionPricer,
{
    let records: Vec<QuoteRecord> = quotes
        .iter()
        .map(|q| {
            let q = q.as_ref();
            let iv = solver.solve(
                q.option_type(),
                q.strike(),
                q.expiry(),
                q.spot(),
                q.bid(),
                q.ask(),
                market,
            );
            QuoteRecord::new(*q, iv)
        })
        .collect();

    let solved = records.iter().filter(|r| r.iv.is_some()).count();
    debug!(quotes = records.len(), solved, "Annotated quotes with implied volatility");
    records
}
