//! Dense resampling of a surface for rendering.

use std::io::Write;

use serde::{Deserialize, Serialize};
use volsurf_core::types::{Date, DayCountConvention};

use crate::error::{Result, SurfaceError};
use crate::grid::Grid;
use crate::surface::Surface;

/// A surface evaluated on a regular (time x strike) lattice.
///
/// `vols[i][j]` is the volatility at `dates[i]` (year fraction
/// `expiries[i]`) and `strikes[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseSample {
    /// Year fractions from the valuation date.
    pub expiries: Vec<f64>,
    /// Sample dates.
    pub dates: Vec<Date>,
    /// Strike axis.
    pub strikes: Vec<f64>,
    /// Volatilities, `[n_points][n_strikes]`.
    pub vols: Vec<Vec<f64>>,
}

impl DenseSample {
    /// Number of time points.
    pub fn n_points(&self) -> usize {
        self.dates.len()
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    /// `SurfaceError::Json` if serialisation fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes pretty-printed JSON to `writer`.
    ///
    /// # Errors
    /// `SurfaceError::Json` on serialisation or write failure.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Evaluates surfaces on evenly spaced dates.
pub struct SurfaceSampler;

impl SurfaceSampler {
    /// Samples `surface` at `n_points` dates from `valuation_date` to
    /// `last_expiry` for each of `strikes`.
    ///
    /// Date `i` is `valuation_date + i * days / (n_points - 1)` whole days,
    /// truncated, where `days` is the span to `last_expiry`. The first date
    /// is the valuation date and the last is `last_expiry`.
    ///
    /// # Errors
    /// * `InsufficientSamplePoints` - `n_points < 2`
    /// * `InvalidGrid` - `last_expiry` is before `valuation_date`
    ///
    /// # Example
    ///
    /// ```
    /// use volsurf_core::types::{Date, DayCountConvention};
    /// use volsurf_engine::{Grid, Surface, SurfaceSampler};
    /// use volsurf_models::MarketContext;
    ///
    /// let valuation = Date::from_ymd(2025, 6, 1).unwrap();
    /// let expiry = Date::from_ymd(2025, 7, 18).unwrap();
    /// let market = MarketContext::new(valuation, 0.03, 0.01);
    /// let grid = Grid::new(vec![expiry], vec![100.0, 110.0], vec![vec![Some(0.48), Some(0.44)]]).unwrap();
    /// let surface = Surface::from_grid(&grid, &market).unwrap();
    ///
    /// let sample = SurfaceSampler::sample(
    ///     &surface,
    ///     5,
    ///     expiry,
    ///     valuation,
    ///     DayCountConvention::Actual365Fixed,
    ///     &[100.0, 110.0],
    /// )
    /// .unwrap();
    /// assert_eq!(sample.vols.len(), 5);
    /// assert_eq!(sample.dates[4], expiry);
    /// ```
    pub fn sample(
        surface: &Surface,
        n_points: usize,
        last_expiry: Date,
        valuation_date: Date,
        day_count: DayCountConvention,
        strikes: &[f64],
    ) -> Result<DenseSample> {
        if n_points < 2 {
            return Err(SurfaceError::InsufficientSamplePoints { got: n_points });
        }

        let days = last_expiry - valuation_date;
        if days < 0 {
            return Err(SurfaceError::InvalidGrid(format!(
                "last expiry {} is before valuation date {}",
                last_expiry, valuation_date
            )));
        }

        let steps = (n_points - 1) as i64;
        let dates = (0..n_points as i64)
            .map(|i| {
                valuation_date.add_days(i * days / steps).ok_or_else(|| {
                    SurfaceError::InvalidGrid(format!(
                        "sample date out of range after {}",
                        valuation_date
                    ))
                })
            })
            .collect::<Result<Vec<Date>>>()?;

        let expiries: Vec<f64> = dates
            .iter()
            .map(|d| day_count.year_fraction_dates(valuation_date, *d))
            .collect();

        let vols = expiries
            .iter()
            .map(|t| strikes.iter().map(|k| surface.query(*t, *k)).collect())
            .collect();

        Ok(DenseSample {
            expiries,
            dates,
            strikes: strikes.to_vec(),
            vols,
        })
    }

    /// Samples up to the grid's last expiry on the grid's strikes, using the
    /// surface's market context.
    ///
    /// # Errors
    /// Same as [`SurfaceSampler::sample`].
    pub fn sample_grid(surface: &Surface, grid: &Grid, n_points: usize) -> Result<DenseSample> {
        let last_expiry = grid
            .expiries()
            .last()
            .copied()
            .ok_or_else(|| SurfaceError::InvalidGrid("grid has no expiries".to_string()))?;
        let market = surface.market();
        Self::sample(
            surface,
            n_points,
            last_expiry,
            market.valuation_date,
            market.day_count,
            grid.strikes(),
        )
    }
}
