//! CLI configuration management
//!
//! Handles loading configuration from TOML files, environment variables and
//! command line flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use volsurf_core::types::{Date, DayCountConvention};
use volsurf_engine::InterpolationSpace;
use volsurf_models::{ImpliedVolConfig, MarketContext};

/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "volsurf.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid number of sample points: {0}. Must be at least 2")]
    InvalidPoints(usize),

    #[error("Invalid volatility bracket: [{vol_min}, {vol_max}]")]
    InvalidBracket { vol_min: f64, vol_max: f64 },

    #[error("Invalid solver setting: {0}")]
    InvalidSolver(String),

    #[error("Invalid market parameter: {0}")]
    InvalidMarket(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Flat continuously compounded risk-free rate
    pub risk_free_rate: f64,
    /// Flat continuous dividend yield
    pub dividend_yield: f64,
    /// Day count for year fractions
    pub day_count: DayCountConvention,
    /// Number of time points in the dense sample
    pub n_points: usize,
    /// Strikes kept per expiry when filtering a chain
    pub atm_count: usize,
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Lower end of the implied volatility bracket
    pub vol_min: f64,
    /// Upper end of the implied volatility bracket
    pub vol_max: f64,
    /// Implied volatility accuracy
    pub tolerance: f64,
    /// Implied volatility iteration cap
    pub max_iterations: usize,
    /// Surface interpolation space
    pub interpolation: InterpolationSpace,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for CliConfig {
    fn default() -> Self {
        let solver = ImpliedVolConfig::default();
        Self {
            risk_free_rate: 0.03,
            dividend_yield: 0.01,
            day_count: DayCountConvention::Actual365Fixed,
            n_points: 50,
            atm_count: volsurf_engine::DEFAULT_ATM_COUNT,
            log_level: LogLevel::Info,
            vol_min: solver.vol_min,
            vol_max: solver.vol_max,
            tolerance: solver.tolerance,
            max_iterations: solver.max_iterations,
            interpolation: InterpolationSpace::Variance,
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config: CliConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Override fields from `VOLSURF_*` variables returned by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rate) = lookup("VOLSURF_RISK_FREE_RATE") {
            self.risk_free_rate = parse_env("VOLSURF_RISK_FREE_RATE", &rate)?;
        }
        if let Some(yield_) = lookup("VOLSURF_DIVIDEND_YIELD") {
            self.dividend_yield = parse_env("VOLSURF_DIVIDEND_YIELD", &yield_)?;
        }
        if let Some(level) = lookup("VOLSURF_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(points) = lookup("VOLSURF_POINTS") {
            self.n_points = parse_env("VOLSURF_POINTS", &points)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_points < 2 {
            return Err(ConfigError::InvalidPoints(self.n_points));
        }
        if !self.risk_free_rate.is_finite() || !self.dividend_yield.is_finite() {
            return Err(ConfigError::InvalidMarket(format!(
                "rate {} and dividend yield {} must be finite",
                self.risk_free_rate, self.dividend_yield
            )));
        }
        if !(self.vol_min > 0.0 && self.vol_min < self.vol_max && self.vol_max.is_finite()) {
            return Err(ConfigError::InvalidBracket {
                vol_min: self.vol_min,
                vol_max: self.vol_max,
            });
        }
        if !(self.tolerance > 0.0) {
            return Err(ConfigError::InvalidSolver(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidSolver(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(log_level) = &cli.log_level {
            if let Ok(level) = LogLevel::from_str(log_level) {
                self.log_level = level;
            }
        } else if cli.verbose {
            self.log_level = LogLevel::Debug;
        }
        if let Some(n_points) = cli.n_points {
            self.n_points = n_points;
        }
        if let Some(atm_count) = cli.atm_count {
            self.atm_count = atm_count;
        }
    }

    /// Solver settings
    pub fn solver_config(&self) -> ImpliedVolConfig {
        ImpliedVolConfig {
            vol_min: self.vol_min,
            vol_max: self.vol_max,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
        }
    }

    /// Market context at the given valuation date
    pub fn market(&self, valuation_date: Date) -> MarketContext {
        MarketContext::new(valuation_date, self.risk_free_rate, self.dividend_yield)
            .with_day_count(self.day_count)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{}={} cannot be parsed", key, value)))
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Raise logging to debug unless a level is given
    pub verbose: bool,
    /// Log level override
    pub log_level: Option<String>,
    /// Sample point override
    pub n_points: Option<usize>,
    /// ATM count override
    pub atm_count: Option<usize>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file (`--config`, else `volsurf.toml` when it exists)
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    let default_file = Path::new(DEFAULT_CONFIG_FILE);
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None if default_file.exists() => CliConfig::from_file(default_file)?,
        None => CliConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.merge_with_cli(cli);

    // Final validation
    config.validate()?;

    Ok(config)
}
