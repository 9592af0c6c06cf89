//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod filter;
pub mod solve;
pub mod surface;

use std::path::Path;

use volsurf_core::types::Date;

use crate::{CliError, Result};

/// Valuation date from `--date`, defaulting to today.
pub fn valuation_date(date: Option<&str>) -> Result<Date> {
    match date {
        Some(s) => Ok(Date::parse(s)?),
        None => Ok(Date::today()),
    }
}

/// Fails with `FileNotFound` when `path` does not exist.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::FileNotFound(path.display().to_string()))
    }
}
