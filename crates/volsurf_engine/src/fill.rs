//! Missing-cell repair.
//!
//! Applied row by row in strike-ascending order:
//!
//! 1. forward fill from the nearest observed strike below;
//! 2. backward fill from the nearest observed strike above;
//! 3. any cell still missing (an all-missing row) takes the median of the
//!    cells observed before any filling.
//!
//! The median is frozen before step 1, so the result does not depend on
//! row order.

use tracing::warn;

use crate::error::{Result, SurfaceError};
use crate::grid::Grid;

/// Returns a copy of `grid` with every missing cell filled.
///
/// A complete grid is returned unchanged, which makes `repair` idempotent.
///
/// # Errors
/// `SurfaceError::EmptyGrid` when the grid has no observed cell.
///
/// # Example
///
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_engine::{fill, Grid};
///
/// let expiries = vec![
///     Date::from_ymd(2025, 7, 18).unwrap(),
///     Date::from_ymd(2025, 8, 15).unwrap(),
/// ];
/// let grid = Grid::new(
///     expiries,
///     vec![90.0, 100.0, 110.0],
///     vec![vec![None, Some(0.3), None], vec![None, None, None]],
/// )
/// .unwrap();
///
/// let repaired = fill::repair(&grid).unwrap();
/// assert_eq!(repaired.row(0), &[Some(0.3), Some(0.3), Some(0.3)]);
/// assert_eq!(repaired.row(1), &[Some(0.3), Some(0.3), Some(0.3)]);
/// ```
pub fn repair(grid: &Grid) -> Result<Grid> {
    let frozen = median(&grid.observed_values()).ok_or(SurfaceError::EmptyGrid)?;

    if grid.is_complete() {
        return Ok(grid.clone());
    }

    let mut residual = 0usize;
    let cells = grid
        .cells()
        .iter()
        .map(|row| {
            let mut row = row.clone();
            forward_fill(&mut row);
            backward_fill(&mut row);
            for cell in row.iter_mut().filter(|c| c.is_none()) {
                *cell = Some(frozen);
                residual += 1;
            }
            row
        })
        .collect();

    if residual > 0 {
        warn!(
            cells = residual,
            median = frozen,
            "Filled expiries with no observed strike from the grid median"
        );
    }

    Ok(grid.with_cells(cells))
}

fn forward_fill(row: &mut [Option<f64>]) {
    let mut last = None;
    for cell in row.iter_mut() {
        match cell {
            Some(v) => last = Some(*v),
            None => *cell = last,
        }
    }
}

fn backward_fill(row: &mut [Option<f64>]) {
    let mut next = None;
    for cell in row.iter_mut().rev() {
        match cell {
            Some(v) => next = Some(*v),
            None => *cell = next,
        }
    }
}

/// Median of `values`, averaging the two middle values for even counts.
///
/// Returns `None` for an empty slice.
///
/// # Example
///
/// ```
/// use volsurf_engine::fill::median;
///
/// assert_eq!(median(&[0.3, 0.1, 0.2]), Some(0.2));
/// assert_eq!(median(&[0.4, 0.1, 0.2, 0.3]), Some(0.25));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(0.5 * (sorted[mid - 1] + sorted[mid]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volsurf_core::types::Date;

    fn expiries(n: usize) -> Vec<Date> {
        (0..n)
            .map(|i| Date::from_ymd(2025, 7 + i as u32, 1).unwrap())
            .collect()
    }

    fn strikes(n: usize) -> Vec<f64> {
        (0..n).map(|j| 90.0 + 5.0 * j as f64).collect()
    }

    fn grid(cells: Vec<Vec<Option<f64>>>) -> Grid {
        let n_strikes = cells.first().map_or(0, Vec::len);
        Grid::new(expiries(cells.len()), strikes(n_strikes), cells).unwrap()
    }

    // ==========================================================
    // median tests
    // ==========================================================

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[5.0]), Some(5.0));
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    // ==========================================================
    // repair tests
    // ==========================================================

    #[test]
    fn test_forward_then_backward_fill() {
        let g = grid(vec![vec![None, Some(0.2), None, None, Some(0.4), None]]);
        let r = repair(&g).unwrap();
        assert_eq!(
            r.row(0),
            &[Some(0.2), Some(0.2), Some(0.2), Some(0.2), Some(0.4), Some(0.4)]
        );
    }

    #[test]
    fn test_empty_row_uses_frozen_median() {
        // Pre-fill observations: 0.1, 0.2, 0.5 -> median 0.2.
        // A progressive median over forward-filled rows would give 0.5.
        let g = grid(vec![
            vec![Some(0.1), None, None],
            vec![None, None, None],
            vec![Some(0.2), None, Some(0.5)],
        ]);
        let r = repair(&g).unwrap();
        assert_eq!(r.row(0), &[Some(0.1), Some(0.1), Some(0.1)]);
        assert_eq!(r.row(1), &[Some(0.2), Some(0.2), Some(0.2)]);
        assert_eq!(r.row(2), &[Some(0.2), Some(0.2), Some(0.5)]);
    }

    #[test]
    fn test_even_count_median_averages() {
        let g = grid(vec![vec![Some(0.2), Some(0.4)], vec![None, None]]);
        let r = repair(&g).unwrap();
        let filled = r.get(1, 0).unwrap();
        assert!((filled - 0.3).abs() < 1e-15);
    }

    #[test]
    fn test_all_missing_is_empty_grid() {
        let g = grid(vec![vec![None, None], vec![None, None]]);
        assert!(matches!(repair(&g), Err(SurfaceError::EmptyGrid)));
    }

    #[test]
    fn test_complete_grid_unchanged() {
        let g = grid(vec![vec![Some(0.3), Some(0.25)], vec![Some(0.28), Some(0.24)]]);
        assert_eq!(repair(&g).unwrap(), g);
    }

    #[test]
    fn test_repair_does_not_mutate_input() {
        let g = grid(vec![vec![None, Some(0.3)]]);
        let _ = repair(&g).unwrap();
        assert_eq!(g.get(0, 0), None);
    }

    // ==========================================================
    // Property-based tests
    // ==========================================================

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn sparse_grid() -> impl Strategy<Value = Grid> {
            (1usize..6, 1usize..8).prop_flat_map(|(rows, cols)| {
                proptest::collection::vec(
                    proptest::collection::vec(proptest::option::weighted(0.4, 0.05..1.5_f64), cols),
                    rows,
                )
                .prop_map(grid)
            })
        }

        proptest! {
            #[test]
            fn test_repair_leaves_no_missing_cells(g in sparse_grid()) {
                match repair(&g) {
                    Ok(r) => {
                        prop_assert!(r.is_complete());
                        prop_assert_eq!(r.expiries(), g.expiries());
                        prop_assert_eq!(r.strikes(), g.strikes());
                        // Observed cells are never overwritten
                        for (i, row) in g.cells().iter().enumerate() {
                            for (j, cell) in row.iter().enumerate() {
                                if let Some(v) = cell {
                                    prop_assert_eq!(r.get(i, j), Some(*v));
                                }
                            }
                        }
                    }
                    Err(SurfaceError::EmptyGrid) => prop_assert!(g.observed_values().is_empty()),
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }
            }

            #[test]
            fn test_repair_is_idempotent(g in sparse_grid()) {
                if let Ok(once) = repair(&g) {
                    let twice = repair(&once).unwrap();
                    prop_assert_eq!(once, twice);
                }
            }
        }
    }
}
