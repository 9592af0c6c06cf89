//! Solve command implementation
//!
//! Annotates a quote file with implied volatilities.

use std::path::Path;

use tracing::{info, warn};
use volsurf_engine::persistence::{annotate_with, read_records_path, write_records_path};
use volsurf_models::ImpliedVolSolver;

use super::{ensure_exists, valuation_date};
use crate::config::CliConfig;
use crate::Result;

/// Run the solve command
pub fn run(config: &CliConfig, input: &Path, output: &Path, date: Option<&str>) -> Result<()> {
    ensure_exists(input)?;
    let market = config.market(valuation_date(date)?);
    let solver = ImpliedVolSolver::new(config.solver_config());

    info!(input = %input.display(), valuation_date = %market.valuation_date, "Solving implied volatilities");

    let records = read_records_path(input)?;
    let annotated = annotate_with(&records, &market, &solver);

    let unsolved = annotated.iter().filter(|r| r.iv.is_none()).count();
    if unsolved > 0 {
        warn!(unsolved, total = annotated.len(), "Some quotes have no implied volatility");
    }

    write_records_path(output, &annotated)?;
    info!(rows = annotated.len(), output = %output.display(), "Solve complete");
    Ok(())
}
