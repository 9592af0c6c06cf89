//! Filter command implementation
//!
//! Reduces a raw option chain to near-the-money calls on upcoming monthly
//! expiries and writes them as a quote file.

use std::path::Path;

use tracing::info;
use volsurf_engine::persistence::{read_chain_path, write_records_path};
use volsurf_engine::select_near_atm;

use super::{ensure_exists, valuation_date};
use crate::config::CliConfig;
use crate::{CliError, Result};

/// Run the filter command
pub fn run(config: &CliConfig, input: &Path, output: &Path, date: Option<&str>) -> Result<()> {
    ensure_exists(input)?;
    if config.atm_count == 0 {
        return Err(CliError::InvalidArgument(
            "count must be at least 1".to_string(),
        ));
    }
    let valuation = valuation_date(date)?;

    info!(input = %input.display(), valuation_date = %valuation, count = config.atm_count, "Filtering option chain");

    let chain = read_chain_path(input)?;
    let selected = select_near_atm(&chain, valuation, config.atm_count);
    if selected.is_empty() {
        return Err(CliError::NoQuotes(format!(
            "{} has no calls on a third-Friday expiry on or after {}",
            input.display(),
            valuation
        )));
    }

    write_records_path(output, &selected)?;
    info!(
        rows = chain.len(),
        selected = selected.len(),
        output = %output.display(),
        "Filter complete"
    );
    Ok(())
}
