//! Bilinear 2D interpolation for surfaces.

use crate::types::InterpolationError;
use num_traits::Float;

/// Bilinear interpolator for 2D grid data.
///
/// Stores a 2D grid of values z(x, y) and performs bilinear interpolation
/// over the four nodes bracketing a query point.
///
/// # Grid Layout
///
/// The grid is stored as `zs[i][j] = z(xs[i], ys[j])` where:
/// - `xs` defines the x-axis coordinates (rows)
/// - `ys` defines the y-axis coordinates (columns)
///
/// An axis with a single coordinate is allowed and is treated as constant
/// along that direction, so a single-expiry smile or a single-strike term
/// structure can still be queried.
///
/// # Example
///
/// ```
/// use volsurf_core::math::interpolators::BilinearInterpolator;
///
/// let xs = [0.0_f64, 1.0, 2.0];
/// let ys = [0.0, 1.0];
/// let zs = [
///     &[0.0, 1.0][..],
///     &[2.0, 3.0][..],
///     &[4.0, 5.0][..],
/// ];
///
/// let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
/// let z = interp.interpolate(0.5, 0.5).unwrap();
/// assert!((z - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BilinearInterpolator<T: Float> {
    /// X-axis coordinates
    xs: Vec<T>,
    /// Y-axis coordinates
    ys: Vec<T>,
    /// Grid values: zs[i][j] = z(xs[i], ys[j])
    zs: Vec<Vec<T>>,
}

impl<T: Float> BilinearInterpolator<T> {
    /// Construct a bilinear interpolator from grid data.
    ///
    /// # Arguments
    ///
    /// * `xs` - Strictly increasing x-axis coordinates (length >= 1)
    /// * `ys` - Strictly increasing y-axis coordinates (length >= 1)
    /// * `zs` - Grid values, one row per x coordinate
    ///
    /// # Returns
    ///
    /// * `Err(InterpolationError::InsufficientData)` - An axis is empty
    /// * `Err(InterpolationError::NonMonotonicData)` - An axis is not strictly increasing
    /// * `Err(InterpolationError::InvalidInput)` - Grid dimensions don't match axis
    ///   lengths, or a coordinate or value is not finite
    pub fn new(xs: &[T], ys: &[T], zs: &[&[T]]) -> Result<Self, InterpolationError> {
        validate_axis(xs)?;
        validate_axis(ys)?;

        if zs.len() != xs.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "Grid rows ({}) must match x-axis length ({})",
                zs.len(),
                xs.len()
            )));
        }

        for (i, row) in zs.iter().enumerate() {
            if row.len() != ys.len() {
                return Err(InterpolationError::InvalidInput(format!(
                    "Grid row {} length ({}) must match y-axis length ({})",
                    i,
                    row.len(),
                    ys.len()
                )));
            }
            if row.iter().any(|z| !z.is_finite()) {
                return Err(InterpolationError::InvalidInput(format!(
                    "Grid row {} contains a non-finite value",
                    i
                )));
            }
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: zs.iter().map(|row| row.to_vec()).collect(),
        })
    }

    /// Interpolate value at point (x, y) using bilinear interpolation.
    ///
    /// # Formula
    ///
    /// ```text
    /// z = (1-u)(1-v)*z00 + u*(1-v)*z10 + (1-u)*v*z01 + u*v*z11
    /// ```
    ///
    /// where `u` and `v` are the normalised coordinates within the grid cell.
    ///
    /// # Returns
    ///
    /// * `Ok(z)` - The interpolated value
    /// * `Err(InterpolationError::OutOfBounds)` - If (x, y) is outside the grid
    pub fn interpolate(&self, x: T, y: T) -> Result<T, InterpolationError> {
        check_bounds(&self.xs, x)?;
        check_bounds(&self.ys, y)?;
        Ok(self.evaluate(x, y))
    }

    /// Interpolate with flat extrapolation on both axes.
    ///
    /// Coordinates outside the grid are clamped to the nearest boundary,
    /// so the boundary row or column value is returned instead of an
    /// unbounded extrapolation. Never fails.
    ///
    /// # Example
    ///
    /// ```
    /// use volsurf_core::math::interpolators::BilinearInterpolator;
    ///
    /// let xs = [0.0_f64, 1.0];
    /// let ys = [0.0, 1.0];
    /// let zs = [&[1.0, 2.0][..], &[3.0, 4.0][..]];
    /// let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
    ///
    /// assert_eq!(interp.interpolate_clamped(7.0, 0.5), interp.interpolate_clamped(1.0, 0.5));
    /// ```
    pub fn interpolate_clamped(&self, x: T, y: T) -> T {
        let (x_min, x_max) = self.domain_x();
        let (y_min, y_max) = self.domain_y();
        self.evaluate(clamp(x, x_min, x_max), clamp(y, y_min, y_max))
    }

    /// Return the valid interpolation domain for x.
    #[inline]
    pub fn domain_x(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Return the valid interpolation domain for y.
    #[inline]
    pub fn domain_y(&self) -> (T, T) {
        (self.ys[0], self.ys[self.ys.len() - 1])
    }

    /// Returns a reference to the x-axis coordinates.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Returns a reference to the y-axis coordinates.
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
    }

    /// Returns a reference to the grid values.
    #[inline]
    pub fn zs(&self) -> &[Vec<T>] {
        &self.zs
    }

    /// Bilinear blend of the cell containing an in-domain point.
    fn evaluate(&self, x: T, y: T) -> T {
        let (i0, i1, u) = locate(&self.xs, x);
        let (j0, j1, v) = locate(&self.ys, y);

        let z00 = self.zs[i0][j0];
        let z10 = self.zs[i1][j0];
        let z01 = self.zs[i0][j1];
        let z11 = self.zs[i1][j1];

        let one = T::one();
        (one - u) * (one - v) * z00 + u * (one - v) * z10 + (one - u) * v * z01 + u * v * z11
    }
}

fn validate_axis<T: Float>(axis: &[T]) -> Result<(), InterpolationError> {
    if axis.is_empty() {
        return Err(InterpolationError::InsufficientData { got: 0, need: 1 });
    }
    if axis.iter().any(|a| !a.is_finite()) {
        return Err(InterpolationError::InvalidInput(
            "Axis contains a non-finite coordinate".to_string(),
        ));
    }
    for i in 1..axis.len() {
        if axis[i] <= axis[i - 1] {
            return Err(InterpolationError::NonMonotonicData { index: i });
        }
    }
    Ok(())
}

fn check_bounds<T: Float>(axis: &[T], x: T) -> Result<(), InterpolationError> {
    let min = axis[0];
    let max = axis[axis.len() - 1];
    if x < min || x > max || x.is_nan() {
        return Err(InterpolationError::OutOfBounds {
            x: x.to_f64().unwrap_or(f64::NAN),
            min: min.to_f64().unwrap_or(f64::NAN),
            max: max.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(())
}

#[inline]
fn clamp<T: Float>(x: T, min: T, max: T) -> T {
    if x < min || x.is_nan() {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

/// Find the bracketing node indices and the normalised weight of the upper node.
#[inline]
fn locate<T: Float>(axis: &[T], x: T) -> (usize, usize, T) {
    if axis.len() == 1 {
        return (0, 0, T::zero());
    }

    let pos = axis.partition_point(|&a| a <= x);
    let i = if pos == 0 {
        0
    } else if pos >= axis.len() {
        axis.len() - 2
    } else {
        pos - 1
    };

    let w = (x - axis[i]) / (axis[i + 1] - axis[i]);
    (i, i + 1, w)
}
