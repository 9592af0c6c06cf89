//! Continuous implied volatility surface over (time to expiry, strike).
//!
//! The default [`InterpolationSpace::Variance`] behaves like a Black
//! variance surface: total variance `w = σ²t` is interpolated bilinearly
//! on a grid that starts with a zero row at `t = 0`, strikes are clamped to
//! the quoted range and variance is extended linearly in `t` past the
//! last expiry (flat volatility).

use serde::{Deserialize, Serialize};
use volsurf_core::math::interpolators::BilinearInterpolator;
use volsurf_core::types::Date;
use volsurf_models::MarketContext;

use crate::error::{Result, SurfaceError};
use crate::grid::Grid;

/// Smallest time used when converting variance back to volatility.
const MIN_TIME: f64 = 1e-5;

/// Quantity the surface interpolates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationSpace {
    /// Bilinear in total variance `σ²t`, flat volatility past the last expiry.
    #[default]
    Variance,
    /// Bilinear directly in volatility, both axes clamped.
    Volatility,
}

impl std::str::FromStr for InterpolationSpace {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "variance" => Ok(InterpolationSpace::Variance),
            "volatility" | "vol" => Ok(InterpolationSpace::Volatility),
            other => Err(format!("Unknown interpolation space: {}", other)),
        }
    }
}

/// Read-only implied volatility surface.
///
/// Queries outside the quoted range never fail: strikes clamp to the
/// quoted range and times clamp (volatility space) or extend at constant
/// volatility (variance space).
///
/// # Example
///
/// ```
/// use volsurf_core::types::Date;
/// use volsurf_engine::{Grid, Surface};
/// use volsurf_models::MarketContext;
///
/// let market = MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01);
/// let grid = Grid::new(
///     vec![Date::from_ymd(2025, 7, 18).unwrap()],
///     vec![100.0, 110.0],
///     vec![vec![Some(0.48), Some(0.44)]],
/// )
/// .unwrap();
///
/// let surface = Surface::from_grid(&grid, &market).unwrap();
/// let t = surface.times()[0];
/// assert!((surface.query(t, 100.0) - 0.48).abs() < 1e-12);
/// assert!((surface.query(t, 50.0) - 0.48).abs() < 1e-12);
/// assert!((surface.query(2.0 * t, 110.0) - 0.44).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Surface {
    interpolator: BilinearInterpolator<f64>,
    times: Vec<f64>,
    strikes: Vec<f64>,
    space: InterpolationSpace,
    market: MarketContext,
}

impl Surface {
    /// Builds a variance-space surface from a complete grid.
    ///
    /// # Errors
    /// * `InvalidGrid` - Missing cells, non-positive volatilities, or an
    ///   expiry not after the valuation date
    /// * `Interpolation` - Expiries collapse to equal year fractions
    pub fn from_grid(grid: &Grid, market: &MarketContext) -> Result<Self> {
        Self::with_space(grid, market, InterpolationSpace::default())
    }

    /// Builds a surface interpolating in the given space.
    ///
    /// # Errors
    /// Same as [`Surface::from_grid`].
    pub fn with_space(
        grid: &Grid,
        market: &MarketContext,
        space: InterpolationSpace,
    ) -> Result<Self> {
        if !grid.is_complete() {
            return Err(SurfaceError::InvalidGrid(format!(
                "{} missing cells; repair the grid first",
                grid.missing_count()
            )));
        }
        if grid.observed_values().iter().any(|v| *v <= 0.0) {
            return Err(SurfaceError::InvalidGrid(
                "volatilities must be positive".to_string(),
            ));
        }

        let times: Vec<f64> = grid
            .expiries()
            .iter()
            .map(|e| market.time_to_expiry(*e))
            .collect();
        if let Some((expiry, _)) = grid
            .expiries()
            .iter()
            .zip(&times)
            .find(|(_, t)| **t <= 0.0)
        {
            return Err(SurfaceError::InvalidGrid(format!(
                "expiry {} is not after valuation date {}",
                expiry, market.valuation_date
            )));
        }

        let vols: Vec<Vec<f64>> = grid
            .cells()
            .iter()
            .map(|row| row.iter().map(|c| c.unwrap_or(f64::NAN)).collect())
            .collect();

        let interpolator = match space {
            InterpolationSpace::Variance => {
                let mut ts = Vec::with_capacity(times.len() + 1);
                ts.push(0.0);
                ts.extend_from_slice(&times);

                let mut rows = Vec::with_capacity(vols.len() + 1);
                rows.push(vec![0.0; grid.strikes().len()]);
                rows.extend(
                    vols.iter()
                        .zip(&times)
                        .map(|(row, t)| row.iter().map(|v| v * v * t).collect::<Vec<_>>()),
                );
                let refs: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
                BilinearInterpolator::new(&ts, grid.strikes(), &refs)?
            }
            InterpolationSpace::Volatility => {
                let refs: Vec<&[f64]> = vols.iter().map(Vec::as_slice).collect();
                BilinearInterpolator::new(&times, grid.strikes(), &refs)?
            }
        };

        Ok(Self {
            interpolator,
            times,
            strikes: grid.strikes().to_vec(),
            space,
            market: *market,
        })
    }

    /// Implied volatility at time `t` (years) and strike `k`.
    pub fn query(&self, t: f64, k: f64) -> f64 {
        match self.space {
            InterpolationSpace::Variance => {
                let t = t.max(MIN_TIME);
                let w = self.variance_at(t, k);
                (w.max(0.0) / t).sqrt()
            }
            InterpolationSpace::Volatility => self.interpolator.interpolate_clamped(t, k),
        }
    }

    /// Alias for [`Surface::query`].
    #[inline]
    pub fn vol(&self, t: f64, k: f64) -> f64 {
        self.query(t, k)
    }

    /// Total implied variance `σ²t`; zero for `t <= 0`.
    pub fn variance(&self, t: f64, k: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        let vol = self.query(t, k);
        vol * vol * t
    }

    /// Implied volatility for an expiry date, using the market's day count.
    pub fn vol_at(&self, expiry: Date, k: f64) -> f64 {
        self.query(self.market.time_to_expiry(expiry), k)
    }

    /// Year fractions of the grid expiries.
    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Quoted strikes.
    #[inline]
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Interpolation space.
    #[inline]
    pub fn space(&self) -> InterpolationSpace {
        self.space
    }

    /// Market context the surface was built against.
    #[inline]
    pub fn market(&self) -> &MarketContext {
        &self.market
    }

    fn variance_at(&self, t: f64, k: f64) -> f64 {
        let t_max = self.times[self.times.len() - 1];
        if t <= t_max {
            self.interpolator.interpolate_clamped(t, k)
        } else {
            self.interpolator.interpolate_clamped(t_max, k) * t / t_max
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market() -> MarketContext {
        MarketContext::new(Date::from_ymd(2025, 6, 1).unwrap(), 0.03, 0.01)
    }

    fn two_by_three() -> Grid {
        Grid::new(
            vec![
                Date::from_ymd(2025, 7, 18).unwrap(),
                Date::from_ymd(2025, 9, 19).unwrap(),
            ],
            vec![90.0, 100.0, 110.0],
            vec![
                vec![Some(0.30), Some(0.25), Some(0.28)],
                vec![Some(0.27), Some(0.24), Some(0.26)],
            ],
        )
        .unwrap()
    }

    // ==========================================================
    // Construction tests
    // ==========================================================

    #[test]
    fn test_incomplete_grid_rejected() {
        let grid = Grid::new(
            vec![Date::from_ymd(2025, 7, 18).unwrap()],
            vec![100.0, 110.0],
            vec![vec![Some(0.3), None]],
        )
        .unwrap();
        assert!(matches!(
            Surface::from_grid(&grid, &market()),
            Err(SurfaceError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_expiry_on_valuation_date_rejected() {
        let grid = Grid::new(
            vec![Date::from_ymd(2025, 6, 1).unwrap()],
            vec![100.0],
            vec![vec![Some(0.3)]],
        )
        .unwrap();
        assert!(matches!(
            Surface::from_grid(&grid, &market()),
            Err(SurfaceError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_non_positive_vol_rejected() {
        let grid = Grid::new(
            vec![Date::from_ymd(2025, 7, 18).unwrap()],
            vec![100.0],
            vec![vec![Some(0.0)]],
        )
        .unwrap();
        assert!(Surface::from_grid(&grid, &market()).is_err());
    }

    #[test]
    fn test_default_space_is_variance() {
        let s = Surface::from_grid(&two_by_three(), &market()).unwrap();
        assert_eq!(s.space(), InterpolationSpace::Variance);
        assert_eq!(s.strikes(), &[90.0, 100.0, 110.0]);
        assert_relative_eq!(s.times()[0], 47.0 / 365.0, epsilon = 1e-15);
    }

    #[test]
    fn test_space_from_str() {
        assert_eq!("Variance".parse::<InterpolationSpace>(), Ok(InterpolationSpace::Variance));
        assert_eq!("vol".parse::<InterpolationSpace>(), Ok(InterpolationSpace::Volatility));
        assert!("cubic".parse::<InterpolationSpace>().is_err());
    }

    // ==========================================================
    // Variance space tests
    // ==========================================================

    #[test]
    fn test_variance_reproduces_nodes() {
        let s = Surface::from_grid(&two_by_three(), &market()).unwrap();
        let t = s.times().to_vec();
        assert_relative_eq!(s.query(t[0], 90.0), 0.30, epsilon = 1e-12);
        assert_relative_eq!(s.query(t[1], 100.0), 0.24, epsilon = 1e-12);
        assert_relative_eq!(s.variance(t[1], 110.0), 0.26 * 0.26 * t[1], epsilon = 1e-12);
    }

    #[test]
    fn test_variance_is_linear_between_expiries() {
        let s = Surface::from_grid(&two_by_three(), &market()).unwrap();
        let (t0, t1) = (s.times()[0], s.times()[1]);
        let t = 0.5 * (t0 + t1);
        let expected = 0.5 * (0.25 * 0.25 * t0 + 0.24 * 0.24 * t1);
        assert_relative_eq!(s.variance(t, 100.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_variance_before_first_expiry_keeps_first_vol() {
        let s = Surface::from_grid(&two_by_three(), &market()).unwrap();
        let t0 = s.times()[0];
        assert_relative_eq!(s.query(0.3 * t0, 100.0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(s.query(0.0, 100.0), 0.25, epsilon = 1e-12);
        assert_eq!(s.variance(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_variance_flat_vol_extrapolation() {
        let s = Surface::from_grid(&two_by_three(), &market()).unwrap();
        let t1 = s.times()[1];
        assert_relative_eq!(s.query(3.0 * t1, 90.0), s.query(t1, 90.0), epsilon = 1e-12);
        assert_relative_eq!(s.query(10.0, 100.0), 0.24, epsilon = 1e-12);
    }

    #[test]
    fn test_strike_clamping() {
        let s = Surface::from_grid(&two_by_three(), &market()).unwrap();
        let t = s.times()[0];
        assert_relative_eq!(s.query(t, 10.0), s.query(t, 90.0), epsilon = 1e-15);
        assert_relative_eq!(s.query(t, 500.0), s.query(t, 110.0), epsilon = 1e-15);
    }

    #[test]
    fn test_vol_at_date() {
        let s = Surface::from_grid(&two_by_three(), &market()).unwrap();
        let expiry = Date::from_ymd(2025, 7, 18).unwrap();
        assert_relative_eq!(s.vol_at(expiry, 110.0), 0.28, epsilon = 1e-12);
        assert_eq!(s.vol(0.5, 95.0), s.query(0.5, 95.0));
    }

    #[test]
    fn test_single_cell_surface_is_flat() {
        let grid = Grid::new(
            vec![Date::from_ymd(2025, 7, 18).unwrap()],
            vec![100.0],
            vec![vec![Some(0.35)]],
        )
        .unwrap();
        for space in [InterpolationSpace::Variance, InterpolationSpace::Volatility] {
            let s = Surface::with_space(&grid, &market(), space).unwrap();
            for (t, k) in [(0.01, 50.0), (0.2, 100.0), (3.0, 200.0)] {
                assert_relative_eq!(s.query(t, k), 0.35, epsilon = 1e-12);
            }
        }
    }

    // ==========================================================
    // Volatility space tests
    // ==========================================================

    #[test]
    fn test_volatility_space_bilinear() {
        let s = Surface::with_space(&two_by_three(), &market(), InterpolationSpace::Volatility)
            .unwrap();
        let (t0, t1) = (s.times()[0], s.times()[1]);
        assert_relative_eq!(s.query(t0, 95.0), 0.275, epsilon = 1e-12);
        assert_relative_eq!(s.query(0.5 * (t0 + t1), 100.0), 0.245, epsilon = 1e-12);
        // Both axes clamp
        assert_relative_eq!(s.query(0.0, 80.0), 0.30, epsilon = 1e-12);
        assert_relative_eq!(s.query(5.0, 120.0), 0.26, epsilon = 1e-12);
    }

    #[test]
    fn test_surface_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Surface>();
    }

    // ==========================================================
    // Property-based tests
    // ==========================================================

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_queries_beyond_bounds_equal_boundary(
                t_scale in 0.0..3.0_f64,
                k in 0.0..300.0_f64,
                variance_space in any::<bool>(),
            ) {
                let space = if variance_space {
                    InterpolationSpace::Variance
                } else {
                    InterpolationSpace::Volatility
                };
                let s = Surface::with_space(&two_by_three(), &market(), space).unwrap();
                let t = s.times()[1] * t_scale;
                let k_clamped = k.clamp(90.0, 110.0);

                let v = s.query(t, k);
                prop_assert!(v.is_finite() && v > 0.0);
                prop_assert!((v - s.query(t, k_clamped)).abs() < 1e-12);

                let t_max = s.times()[1];
                if t > t_max {
                    prop_assert!((v - s.query(t_max, k_clamped)).abs() < 1e-12);
                }
            }
        }
    }
}
