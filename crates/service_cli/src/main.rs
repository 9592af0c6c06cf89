//! volsurf CLI - Implied Volatility Surface Operations
//!
//! This is the operational entry point for the volsurf engine.
//!
//! # Commands
//!
//! - `volsurf filter --input chain.csv --output quotes.csv` - Keep near-the-money
//!   calls on upcoming monthly expiries
//! - `volsurf solve --input quotes.csv --output solved.csv` - Annotate quotes
//!   with implied volatilities
//! - `volsurf surface --input quotes.csv [--output sample.json]` - Build the
//!   surface and write a dense sample
//!
//! # Configuration
//!
//! Defaults, then `volsurf.toml` (or `--config`), then `VOLSURF_*`
//! environment variables, then command line flags. `RUST_LOG` overrides
//! the configured log level.
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate orchestrates the core,
//! model and engine layers behind a command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

/// volsurf implied volatility surface CLI
#[derive(Parser)]
#[command(name = "volsurf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce a raw option chain to near-the-money monthly calls
    Filter {
        /// Raw chain CSV (option,bid,ask,spot columns)
        #[arg(short, long)]
        input: PathBuf,

        /// Output quote CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Valuation date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Strikes kept per expiry
        #[arg(long)]
        count: Option<usize>,
    },

    /// Annotate a quote file with implied volatilities
    Solve {
        /// Input quote CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output quote CSV with the iv column filled
        #[arg(short, long)]
        output: PathBuf,

        /// Valuation date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Build the surface and write a dense JSON sample
    Surface {
        /// Input quote CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of sample dates
        #[arg(short, long)]
        points: Option<usize>,

        /// Valuation date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Use the stored iv column instead of re-solving when present
        #[arg(long)]
        use_stored_iv: bool,
    },
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (n_points, atm_count) = match &cli.command {
        Commands::Surface { points, .. } => (*points, None),
        Commands::Filter { count, .. } => (None, *count),
        Commands::Solve { .. } => (None, None),
    };
    let args = config::CliArgs {
        config_file: cli.config.clone(),
        verbose: cli.verbose,
        log_level: cli.log_level.clone(),
        n_points,
        atm_count,
    };
    let config = config::build_config(&args)?;

    init_tracing(config.log_level.as_filter_str());

    info!("volsurf v{}", env!("CARGO_PKG_VERSION"));
    info!(
        risk_free_rate = config.risk_free_rate,
        dividend_yield = config.dividend_yield,
        day_count = %config.day_count,
        log_level = %config.log_level,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Filter {
            input,
            output,
            date,
            ..
        } => commands::filter::run(&config, &input, &output, date.as_deref()),
        Commands::Solve {
            input,
            output,
            date,
        } => commands::solve::run(&config, &input, &output, date.as_deref()),
        Commands::Surface {
            input,
            output,
            date,
            use_stored_iv,
            ..
        } => commands::surface::run(
            &config,
            &input,
            output.as_deref(),
            date.as_deref(),
            use_stored_iv,
        ),
    }
}
