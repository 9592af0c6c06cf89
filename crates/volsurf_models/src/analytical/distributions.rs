//! Standard normal distribution functions.
//!
//! This module provides:
//! - `norm_cdf`: Cumulative distribution function (CDF)
//! - `norm_pdf`: Probability density function (PDF)
//!
//! The CDF uses Hart's (1968) rational approximation in the double precision
//! form given by West (2005), with a continued-fraction tail for |x| >= 5√2.
//! Absolute error is below 1e-14 across the real line, which keeps option
//! prices monotone in volatility well below the implied volatility
//! solver's tolerance.

use num_traits::Float;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// sqrt(2 * pi)
const SQRT_2PI: f64 = 2.506_628_274_631;

/// Boundary between the rational approximation and the continued fraction.
const TAIL_CUTOFF: f64 = 7.071_067_811_865_47;

/// Beyond this the tail probability underflows.
const UNDERFLOW_CUTOFF: f64 = 37.0;

const NUMERATOR: [f64; 7] = [
    3.526_249_659_989_11e-2,
    0.700_383_064_443_688,
    6.373_962_203_531_65,
    33.912_866_078_383,
    112.079_291_497_871,
    221.213_596_169_931,
    220.206_867_912_376,
];

const DENOMINATOR: [f64; 8] = [
    8.838_834_764_831_84e-2,
    1.755_667_163_182_64,
    16.064_177_579_207,
    86.780_732_202_946_1,
    296.564_248_779_674,
    637.333_633_378_831,
    793.826_512_519_948,
    440.413_735_824_752,
];

/// Converts an `f64` constant into `T`.
#[inline]
pub(crate) fn lit<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

#[inline]
fn horner<T: Float>(coefficients: &[f64], x: T) -> T {
    coefficients
        .iter()
        .fold(T::zero(), |acc, &c| acc * x + lit::<T>(c))
}

/// Standard normal cumulative distribution function.
///
/// Computes P(X <= x) where X ~ N(0, 1).
///
/// # Arguments
/// * `x` - Input value
///
/// # Returns
/// The probability P(X <= x) for standard normal X, in range [0, 1].
/// NaN input yields NaN.
///
/// # Examples
/// ```
/// use volsurf_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-15);
/// assert!((norm_cdf(1.0_f64) - 0.841_344_746_068_542_9).abs() < 1e-14);
/// assert!(norm_cdf(-40.0_f64) == 0.0);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    if x.is_nan() {
        return x;
    }

    let x_abs = x.abs();
    let tail = if x_abs > lit(UNDERFLOW_CUTOFF) {
        T::zero()
    } else {
        let exponential = (-x_abs * x_abs * lit(0.5)).exp();
        if x_abs < lit(TAIL_CUTOFF) {
            exponential * horner(&NUMERATOR, x_abs) / horner(&DENOMINATOR, x_abs)
        } else {
            let mut build = x_abs + lit(0.65);
            for k in [4.0, 3.0, 2.0, 1.0] {
                build = x_abs + lit::<T>(k) / build;
            }
            exponential / build / lit(SQRT_2PI)
        }
    };

    if x > T::zero() {
        T::one() - tail
    } else {
        tail
    }
}

/// Standard normal probability density function.
///
/// φ(x) = (1 / sqrt(2π)) * exp(-x² / 2)
///
/// # Examples
/// ```
/// use volsurf_models::analytical::distributions::norm_pdf;
///
/// // φ(0) = 1 / sqrt(2π) ≈ 0.3989
/// assert!((norm_pdf(0.0_f64) - 0.3989422804).abs() < 1e-10);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    lit::<T>(FRAC_1_SQRT_2PI) * (-x * x * lit(0.5)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==========================================================
    // norm_cdf tests
    // ==========================================================

    #[test]
    fn test_norm_cdf_at_zero() {
        assert_relative_eq!(norm_cdf(0.0_f64), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_norm_cdf_symmetry() {
        let test_values = [-6.0_f64, -3.0, -2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0, 3.0, 6.0];
        for x in test_values {
            assert_relative_eq!(norm_cdf(x) + norm_cdf(-x), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_norm_cdf_reference_values() {
        assert_relative_eq!(norm_cdf(1.0_f64), 0.841_344_746_068_542_9, epsilon = 1e-14);
        assert_relative_eq!(norm_cdf(-1.0_f64), 0.158_655_253_931_457_07, epsilon = 1e-14);
        assert_relative_eq!(norm_cdf(2.0_f64), 0.977_249_868_051_820_8, epsilon = 1e-14);
        assert_relative_eq!(norm_cdf(-2.0_f64), 0.022_750_131_948_179_195, epsilon = 1e-14);
        assert_relative_eq!(norm_cdf(3.0_f64), 0.998_650_101_968_369_9, epsilon = 1e-14);
        assert_relative_eq!(norm_cdf(-0.5_f64), 0.308_537_538_725_986_9, epsilon = 1e-14);
    }

    #[test]
    fn test_norm_cdf_tail_branch() {
        // Continued fraction region: Φ(-8) ≈ 6.22096e-16
        let value = norm_cdf(-8.0_f64);
        assert_relative_eq!(value, 6.220_960_574_271_785e-16, max_relative = 1e-6);
        assert!(norm_cdf(8.0_f64) <= 1.0);
    }

    #[test]
    fn test_norm_cdf_extreme_values() {
        assert_eq!(norm_cdf(-50.0_f64), 0.0);
        assert_eq!(norm_cdf(50.0_f64), 1.0);
        assert_eq!(norm_cdf(f64::NEG_INFINITY), 0.0);
        assert_eq!(norm_cdf(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_norm_cdf_nan() {
        assert!(norm_cdf(f64::NAN).is_nan());
    }

    #[test]
    fn test_norm_cdf_monotonic() {
        let mut prev = norm_cdf(-10.0_f64);
        let mut x = -10.0;
        while x < 10.0 {
            x += 0.01;
            let current = norm_cdf(x);
            assert!(current >= prev, "CDF decreased at x = {}", x);
            prev = current;
        }
    }

    #[test]
    fn test_norm_cdf_continuous_at_cutoff() {
        let below = norm_cdf(-(TAIL_CUTOFF - 1e-9));
        let above = norm_cdf(-(TAIL_CUTOFF + 1e-9));
        assert_relative_eq!(below, above, max_relative = 1e-6);
    }

    #[test]
    fn test_norm_cdf_f32() {
        assert!((norm_cdf(1.0_f32) - 0.841_344_7).abs() < 1e-6);
    }

    // ==========================================================
    // norm_pdf tests
    // ==========================================================

    #[test]
    fn test_norm_pdf_reference_values() {
        assert_relative_eq!(norm_pdf(0.0_f64), 0.398_942_280_401_432_7, epsilon = 1e-15);
        assert_relative_eq!(norm_pdf(1.0_f64), 0.241_970_724_519_143_37, epsilon = 1e-15);
        assert_relative_eq!(norm_pdf(-2.0_f64), 0.053_990_966_513_188_06, epsilon = 1e-15);
    }

    #[test]
    fn test_norm_pdf_symmetry() {
        for x in [0.3, 1.7, 4.2] {
            assert_eq!(norm_pdf(x), norm_pdf(-x));
        }
    }

    #[test]
    fn test_pdf_is_cdf_derivative() {
        let h = 1e-6;
        for x in [-2.0, -0.5, 0.0, 0.7, 1.9] {
            let fd = (norm_cdf(x + h) - norm_cdf(x - h)) / (2.0 * h);
            assert_relative_eq!(fd, norm_pdf(x), epsilon = 1e-8);
        }
    }
}
