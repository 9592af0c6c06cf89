//! Surface command implementation
//!
//! Builds the implied volatility grid and surface from a quote file and
//! writes the dense sample as JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;
use volsurf_engine::persistence::read_records_path;
use volsurf_engine::{DenseSample, GridBuilder, Surface, SurfaceSampler, VolSource};
use volsurf_models::ImpliedVolSolver;

use super::{ensure_exists, valuation_date};
use crate::config::CliConfig;
use crate::Result;

/// Run the surface command
pub fn run(
    config: &CliConfig,
    input: &Path,
    output: Option<&Path>,
    date: Option<&str>,
    use_stored_iv: bool,
) -> Result<()> {
    let sample = build_sample(config, input, date, use_stored_iv)?;

    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            sample.write_json(&mut writer)?;
            writer.flush()?;
            info!(output = %path.display(), "Surface sample written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            sample.write_json(&mut handle)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}

/// Quote file to dense sample
pub fn build_sample(
    config: &CliConfig,
    input: &Path,
    date: Option<&str>,
    use_stored_iv: bool,
) -> Result<DenseSample> {
    ensure_exists(input)?;
    let market = config.market(valuation_date(date)?);
    let vol_source = if use_stored_iv {
        VolSource::PreferStored
    } else {
        VolSource::Solve
    };

    info!(
        input = %input.display(),
        valuation_date = %market.valuation_date,
        n_points = config.n_points,
        interpolation = ?config.interpolation,
        ?vol_source,
        "Building surface"
    );

    let records = read_records_path(input)?;
    let grid = GridBuilder::new(market)
        .with_solver(ImpliedVolSolver::new(config.solver_config()))
        .with_vol_source(vol_source)
        .build_records(&records)?;
    let surface = Surface::with_space(&grid, &market, config.interpolation)?;
    let sample = SurfaceSampler::sample_grid(&surface, &grid, config.n_points)?;

    info!(
        expiries = grid.expiries().len(),
        strikes = grid.strikes().len(),
        points = sample.n_points(),
        "Surface sampled"
    );
    Ok(sample)
}
