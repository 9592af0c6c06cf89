//! Rectangular (expiry, strike) implied volatility grid.
//!
//! [`GridBuilder`] turns scattered quotes into a [`Grid`]:
//!
//! 1. quotes expiring on or before the valuation date are dropped;
//! 2. the axes are the sorted distinct expiries and strikes;
//! 3. each cell takes the first quote for it in input order;
//! 4. the selected quote is inverted for its implied volatility, and a
//!    failure leaves the cell missing;
//! 5. missing cells are repaired by [`crate::fill::repair`].
//!
//! # Parallel solving
//!
//! With the `parallel` feature the per-cell inversions run on the rayon
//! thread pool. The result is identical to the sequential path.

use serde::Serialize;
use tracing::{debug, info, warn};
use volsurf_core::types::Date;
use volsurf_models::{BsmPricer, ImpliedVolConfig, ImpliedVolSolver, MarketContext, OptionPricer};

use crate::error::{Result, SurfaceError};
use crate::fill;
use crate::quote::{Quote, QuoteRecord};

/// Implied volatilities on a rectangular (expiry, strike) lattice.
///
/// `cells[i][j]` holds the volatility for `expiries[i]` and `strikes[j]`,
/// or `None` when no usable quote was observed there. Both axes are
/// strictly ascending.
///
/// # Example
///
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_engine::Grid;
///
/// let expiries = vec![Date::from_ymd(2025, 7, 18).unwrap()];
/// let grid = Grid::new(expiries, vec![100.0, 110.0], vec![vec![Some(0.2), None]]).unwrap();
///
/// assert_eq!(grid.get(0, 0), Some(0.2));
/// assert_eq!(grid.missing_count(), 1);
/// assert!(!grid.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    expiries: Vec<Date>,
    strikes: Vec<f64>,
    cells: Vec<Vec<Option<f64>>>,
}

impl Grid {
    /// Creates a grid after checking axis order and cell shape.
    ///
    /// # Errors
    /// `SurfaceError::InvalidGrid` when an axis is empty or not strictly
    /// ascending, a strike is not finite and positive, the cell matrix
    /// does not match the axes, or an observed value is not finite.
    pub fn new(
        expiries: Vec<Date>,
        strikes: Vec<f64>,
        cells: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if expiries.is_empty() || strikes.is_empty() {
            return Err(SurfaceError::InvalidGrid(
                "grid needs at least one expiry and one strike".to_string(),
            ));
        }
        if let Some(i) = expiries.windows(2).position(|w| w[0] >= w[1]) {
            return Err(SurfaceError::InvalidGrid(format!(
                "expiries not strictly ascending at index {}",
                i + 1
            )));
        }
        if strikes.iter().any(|k| !k.is_finite() || *k <= 0.0) {
            return Err(SurfaceError::InvalidGrid(
                "strikes must be finite and positive".to_string(),
            ));
        }
        if let Some(j) = strikes.windows(2).position(|w| w[0] >= w[1]) {
            return Err(SurfaceError::InvalidGrid(format!(
                "strikes not strictly ascending at index {}",
                j + 1
            )));
        }
        if cells.len() != expiries.len() {
            return Err(SurfaceError::InvalidGrid(format!(
                "expected {} rows, got {}",
                expiries.len(),
                cells.len()
            )));
        }
        for (i, row) in cells.iter().enumerate() {
            if row.len() != strikes.len() {
                return Err(SurfaceError::InvalidGrid(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    strikes.len()
                )));
            }
            if row.iter().flatten().any(|v| !v.is_finite()) {
                return Err(SurfaceError::InvalidGrid(format!(
                    "row {} contains a non-finite volatility",
                    i
                )));
            }
        }

        Ok(Self {
            expiries,
            strikes,
            cells,
        })
    }

    /// Expiry axis, ascending.
    #[inline]
    pub fn expiries(&self) -> &[Date] {
        &self.expiries
    }

    /// Strike axis, ascending.
    #[inline]
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// All rows, indexed `[expiry][strike]`.
    #[inline]
    pub fn cells(&self) -> &[Vec<Option<f64>>] {
        &self.cells
    }

    /// Cell value, `None` when missing or out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.cells.get(i).and_then(|row| row.get(j)).copied().flatten()
    }

    /// Row for the `i`-th expiry.
    ///
    /// # Panics
    /// When `i` is out of range.
    #[inline]
    pub fn row(&self, i: usize) -> &[Option<f64>] {
        &self.cells[i]
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|c| c.is_none()).count())
            .sum()
    }

    /// True when no cell is missing.
    pub fn is_complete(&self) -> bool {
        self.missing_count() == 0
    }

    /// Observed values in row-major order.
    pub fn observed_values(&self) -> Vec<f64> {
        self.cells.iter().flatten().flatten().copied().collect()
    }

    /// Same axes, new cells. Shape is the caller's responsibility.
    pub(crate) fn with_cells(&self, cells: Vec<Vec<Option<f64>>>) -> Self {
        debug_assert_eq!(cells.len(), self.expiries.len());
        Self {
            expiries: self.expiries.clone(),
            strikes: self.strikes.clone(),
            cells,
        }
    }
}

/// Where cell volatilities come from when building from records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VolSource {
    /// Always invert the quote mid.
    #[default]
    Solve,
    /// Use a stored finite positive `iv` when present, otherwise invert.
    PreferStored,
}

/// Builds repaired implied volatility grids from quotes.
///
/// # Example
///
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_engine::{GridBuilder, Quote};
/// use volsurf_models::{MarketContext, OptionType};
///
/// let market = MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01);
/// let expiry = Date::from_ymd(2025, 7, 18).unwrap();
/// let quotes = vec![
///     Quote::new(expiry, 100.0, OptionType::Call, 9.8, 10.2, 105.0).unwrap(),
///     Quote::new(expiry, 110.0, OptionType::Call, 4.5, 4.9, 105.0).unwrap(),
/// ];
///
/// let grid = GridBuilder::new(market).build(&quotes).unwrap();
/// assert!(grid.is_complete());
/// assert_eq!(grid.strikes(), &[100.0, 110.0]);
/// ```
#[derive(Debug, Clone)]
pub struct GridBuilder<P: OptionPricer = BsmPricer> {
    market: MarketContext,
    solver: ImpliedVolSolver<P>,
    vol_source: VolSource,
}

impl GridBuilder<BsmPricer> {
    /// Builder with the default Black-Scholes-Merton solver.
    pub fn new(market: MarketContext) -> Self {
        Self {
            market,
            solver: ImpliedVolSolver::new(ImpliedVolConfig::default()),
            vol_source: VolSource::Solve,
        }
    }
}

impl<P: OptionPricer + Sync> GridBuilder<P> {
    /// Replaces the implied volatility solver.
    pub fn with_solver<Q: OptionPricer + Sync>(self, solver: ImpliedVolSolver<Q>) -> GridBuilder<Q> {
        GridBuilder {
            market: self.market,
            solver,
            vol_source: self.vol_source,
        }
    }

    /// Sets where record volatilities come from.
    pub fn with_vol_source(mut self, vol_source: VolSource) -> Self {
        self.vol_source = vol_source;
        self
    }

    /// Market context used for every inversion.
    pub fn market(&self) -> &MarketContext {
        &self.market
    }

    /// Builds and repairs a grid from raw quotes.
    ///
    /// Quotes expiring on or before the valuation date are dropped before
    /// the axes are built, so their expiries never appear as rows.
    ///
    /// # Errors
    /// * `EmptyGrid` - No quote survives or none could be inverted
    pub fn build(&self, quotes: &[Quote]) -> Result<Grid> {
        let records: Vec<QuoteRecord> = quotes.iter().copied().map(QuoteRecord::from).collect();
        self.build_records(&records)
    }

    /// Builds and repairs a grid from persisted records.
    ///
    /// With [`VolSource::PreferStored`] a usable stored `iv` is taken as is.
    ///
    /// # Errors
    /// * `EmptyGrid` - No quote survives or none could be inverted
    pub fn build_records(&self, records: &[QuoteRecord]) -> Result<Grid> {
        let observed = self.observe(records)?;
        fill::repair(&observed)
    }

    /// Assembles the grid without repairing it.
    ///
    /// # Errors
    /// * `EmptyGrid` - Every quote expired before the valuation date
    pub fn observe(&self, records: &[QuoteRecord]) -> Result<Grid> {
        let valuation = self.market.valuation_date;
        let live: Vec<&QuoteRecord> = records
            .iter()
            .filter(|r| {
                let keep = r.quote.expiry() > valuation;
                if !keep {
                    warn!(
                        expiry = %r.quote.expiry(),
                        strike = r.quote.strike(),
                        valuation_date = %valuation,
                        "Dropping quote that expires on or before the valuation date"
                    );
                }
                keep
            })
            .collect();

        if live.is_empty() {
            return Err(SurfaceError::EmptyGrid);
        }

        let mut expiries: Vec<Date> = live.iter().map(|r| r.quote.expiry()).collect();
        expiries.sort_unstable();
        expiries.dedup();

        let mut strikes: Vec<f64> = live.iter().map(|r| r.quote.strike()).collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup();

        let mut selected: Vec<Vec<Option<&QuoteRecord>>> = vec![vec![None; strikes.len()]; expiries.len()];
        let mut duplicates = 0usize;
        for record in live {
            let (i, j) = cell_index(&expiries, &strikes, &record.quote);
            match selected[i][j] {
                Some(_) => duplicates += 1,
                None => selected[i][j] = Some(record),
            }
        }
        if duplicates > 0 {
            debug!(duplicates, "Ignored later quotes for already populated cells");
        }

        let tasks: Vec<(usize, usize, &QuoteRecord)> = selected
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter_map(move |(j, r)| r.map(|r| (i, j, r)))
            })
            .collect();

        let vols = self.solve_cells(&tasks);

        let mut cells = vec![vec![None; strikes.len()]; expiries.len()];
        for (&(i, j, _), vol) in tasks.iter().zip(vols) {
            cells[i][j] = vol;
        }

        let grid = Grid::new(expiries, strikes, cells)?;
        info!(
            expiries = grid.expiries().len(),
            strikes = grid.strikes().len(),
            observed = grid.observed_values().len(),
            missing = grid.missing_count(),
            "Assembled implied volatility grid"
        );
        Ok(grid)
    }

    #[cfg(feature = "parallel")]
    fn solve_cells(&self, tasks: &[(usize, usize, &QuoteRecord)]) -> Vec<Option<f64>> {
        use rayon::prelude::*;

        tasks.par_iter().map(|(_, _, r)| self.cell_vol(r)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_cells(&self, tasks: &[(usize, usize, &QuoteRecord)]) -> Vec<Option<f64>> {
        tasks.iter().map(|(_, _, r)| self.cell_vol(r)).collect()
    }

    fn cell_vol(&self, record: &QuoteRecord) -> Option<f64> {
        if self.vol_source == VolSource::PreferStored {
            if let Some(iv) = record.usable_iv() {
                return Some(iv);
            }
        }

        let q = &record.quote;
        match self.solver.try_solve(
            q.option_type(),
            q.strike(),
            q.expiry(),
            q.spot(),
            q.bid(),
            q.ask(),
            &self.market,
        ) {
            Ok(vol) => Some(vol),
            Err(e) => {
                debug!(
                    expiry = %q.expiry(),
                    strike = q.strike(),
                    option_type = %q.option_type(),
                    error = %e,
                    "No implied volatility; cell left missing"
                );
                None
            }
        }
    }
}

/// Axis positions of a quote known to be on both axes.
fn cell_index(expiries: &[Date], strikes: &[f64], quote: &Quote) -> (usize, usize) {
    let i = expiries.partition_point(|e| *e < quote.expiry());
    let j = strikes.partition_point(|k| k.total_cmp(&quote.strike()).is_lt());
    (i, j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use volsurf_models::OptionType;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn market() -> MarketContext {
        MarketContext::new(date(2025, 6, 1), 0.03, 0.01)
    }

    fn call(expiry: Date, strike: f64, bid: f64, ask: f64) -> Quote {
        Quote::new(expiry, strike, OptionType::Call, bid, ask, 105.0).unwrap()
    }

    // ==========================================================
    // Grid construction tests
    // ==========================================================

    #[test]
    fn test_grid_new_rejects_unsorted_axes() {
        let e = vec![date(2025, 8, 15), date(2025, 7, 18)];
        let cells = vec![vec![Some(0.2)], vec![Some(0.2)]];
        assert!(matches!(
            Grid::new(e, vec![100.0], cells),
            Err(SurfaceError::InvalidGrid(_))
        ));

        let e = vec![date(2025, 7, 18)];
        assert!(Grid::new(e.clone(), vec![110.0, 100.0], vec![vec![None, None]]).is_err());
        assert!(Grid::new(e, vec![100.0, 100.0], vec![vec![None, None]]).is_err());
    }

    #[test]
    fn test_grid_new_rejects_shape_mismatch() {
        let e = vec![date(2025, 7, 18)];
        assert!(Grid::new(e.clone(), vec![100.0, 110.0], vec![vec![Some(0.2)]]).is_err());
        assert!(Grid::new(e, vec![100.0], vec![]).is_err());
    }

    #[test]
    fn test_grid_new_rejects_bad_values() {
        let e = vec![date(2025, 7, 18)];
        assert!(Grid::new(e.clone(), vec![100.0], vec![vec![Some(f64::NAN)]]).is_err());
        assert!(Grid::new(e.clone(), vec![-1.0], vec![vec![None]]).is_err());
        assert!(Grid::new(vec![], vec![100.0], vec![]).is_err());
        assert!(Grid::new(e, vec![], vec![vec![]]).is_err());
    }

    #[test]
    fn test_grid_accessors() {
        let e = vec![date(2025, 7, 18), date(2025, 8, 15)];
        let grid = Grid::new(
            e,
            vec![90.0, 100.0],
            vec![vec![Some(0.3), None], vec![None, Some(0.25)]],
        )
        .unwrap();

        assert_eq!(grid.get(0, 0), Some(0.3));
        assert_eq!(grid.get(0, 1), None);
        assert_eq!(grid.get(5, 5), None);
        assert_eq!(grid.row(1), &[None, Some(0.25)]);
        assert_eq!(grid.missing_count(), 2);
        assert!(!grid.is_complete());
        assert_eq!(grid.observed_values(), vec![0.3, 0.25]);
    }

    // ==========================================================
    // Builder tests
    // ==========================================================

    #[test]
    fn test_build_sorts_and_dedups_axes() {
        let quotes = vec![
            call(date(2025, 8, 15), 110.0, 6.0, 6.4),
            call(date(2025, 7, 18), 100.0, 9.8, 10.2),
            call(date(2025, 7, 18), 110.0, 4.5, 4.9),
            call(date(2025, 8, 15), 100.0, 11.0, 11.5),
        ];
        let grid = GridBuilder::new(market()).observe(&records(&quotes)).unwrap();

        assert_eq!(grid.expiries(), &[date(2025, 7, 18), date(2025, 8, 15)]);
        assert_eq!(grid.strikes(), &[100.0, 110.0]);
        assert!(grid.is_complete());
    }

    #[test]
    fn test_build_first_quote_per_cell_wins() {
        let e = date(2025, 7, 18);
        let first = call(e, 100.0, 9.8, 10.2);
        let later = call(e, 100.0, 14.0, 14.4);
        let grid = GridBuilder::new(market()).build(&[first, later]).unwrap();

        let solo = GridBuilder::new(market()).build(&[first]).unwrap();
        assert_eq!(grid.get(0, 0), solo.get(0, 0));
        assert_relative_eq!(grid.get(0, 0).unwrap(), 0.48352446, epsilon = 1e-5);
    }

    #[test]
    fn test_build_drops_expired_quotes() {
        let quotes = vec![
            call(date(2025, 5, 16), 95.0, 10.0, 10.5),
            call(date(2025, 6, 1), 95.0, 10.0, 10.5),
            call(date(2025, 7, 18), 100.0, 9.8, 10.2),
        ];
        let grid = GridBuilder::new(market()).build(&quotes).unwrap();
        assert_eq!(grid.expiries(), &[date(2025, 7, 18)]);
        assert_eq!(grid.strikes(), &[100.0]);
    }

    #[test]
    fn test_build_all_expired_is_empty_grid() {
        let quotes = vec![call(date(2025, 5, 16), 95.0, 10.0, 10.5)];
        assert!(matches!(
            GridBuilder::new(market()).build(&quotes),
            Err(SurfaceError::EmptyGrid)
        ));
        assert!(matches!(
            GridBuilder::new(market()).build(&[]),
            Err(SurfaceError::EmptyGrid)
        ));
    }

    #[test]
    fn test_unsolvable_cell_is_missing_then_filled() {
        let e = date(2025, 7, 18);
        // Mid of 1.0 on a deep ITM call is below intrinsic
        let quotes = vec![call(e, 100.0, 9.8, 10.2), call(e, 80.0, 0.9, 1.1)];
        let builder = GridBuilder::new(market());

        let observed = builder.observe(&records(&quotes)).unwrap();
        assert_eq!(observed.get(0, 0), None);
        assert!(observed.get(0, 1).is_some());

        let grid = builder.build(&quotes).unwrap();
        assert!(grid.is_complete());
        assert_eq!(grid.get(0, 0), grid.get(0, 1));
    }

    #[test]
    fn test_empty_market_cell_is_filled_from_neighbour() {
        let e = date(2025, 7, 18);
        let quotes = vec![
            call(e, 100.0, 9.8, 10.2),
            call(e, 110.0, 4.5, 4.9),
            call(e, 120.0, 0.0, 0.0),
        ];
        let builder = GridBuilder::new(market());

        let observed = builder.observe(&records(&quotes)).unwrap();
        assert_eq!(observed.get(0, 2), None);

        let grid = builder.build(&quotes).unwrap();
        assert!(grid.is_complete());
        assert_eq!(grid.get(0, 2), grid.get(0, 1));
        assert_relative_eq!(grid.get(0, 2).unwrap(), 0.443_379_54, epsilon = 1e-5);
    }

    #[test]
    fn test_build_every_quote_unsolvable_is_empty_grid() {
        let e = date(2025, 7, 18);
        let quotes = vec![call(e, 100.0, 0.0, 0.1), call(e, 110.0, 200.0, 201.0)];
        assert!(matches!(
            GridBuilder::new(market()).build(&quotes),
            Err(SurfaceError::EmptyGrid)
        ));
    }

    #[test]
    fn test_prefer_stored_uses_record_iv() {
        let e = date(2025, 7, 18);
        let records = vec![
            QuoteRecord::new(call(e, 100.0, 9.8, 10.2), Some(0.33)),
            QuoteRecord::new(call(e, 110.0, 4.5, 4.9), None),
        ];

        let stored = GridBuilder::new(market())
            .with_vol_source(VolSource::PreferStored)
            .build_records(&records)
            .unwrap();
        assert_eq!(stored.get(0, 0), Some(0.33));
        assert_relative_eq!(stored.get(0, 1).unwrap(), 0.44337954, epsilon = 1e-5);

        let solved = GridBuilder::new(market()).build_records(&records).unwrap();
        assert_relative_eq!(solved.get(0, 0).unwrap(), 0.48352446, epsilon = 1e-5);
    }

    #[test]
    fn test_with_solver_uses_custom_config() {
        let e = date(2025, 7, 18);
        let config = ImpliedVolConfig {
            vol_min: 0.5,
            vol_max: 2.0,
            ..ImpliedVolConfig::default()
        };
        // 0.48 lies below the narrowed bracket
        let observed = GridBuilder::new(market())
            .with_solver(ImpliedVolSolver::new(config))
            .observe(&records(&[call(e, 100.0, 9.8, 10.2), call(e, 110.0, 6.0, 6.4)]))
            .unwrap();
        assert_eq!(observed.get(0, 0), None);
        assert!(observed.get(0, 1).is_some());
    }

    #[test]
    fn test_grid_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grid>();
        assert_send_sync::<GridBuilder>();
    }

    fn records(quotes: &[Quote]) -> Vec<QuoteRecord> {
        quotes.iter().copied().map(QuoteRecord::from).collect()
    }
}
