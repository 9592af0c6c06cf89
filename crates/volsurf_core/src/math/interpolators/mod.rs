//! Interpolation methods for numerical computation.
//!
//! ## Available Interpolators
//!
//! - [`BilinearInterpolator`]: 2D grid interpolation for surfaces, with a
//!   strict mode that rejects out-of-domain queries and a clamped mode that
//!   holds boundary values flat
//!
//! ## Example
//!
//! ```
//! use volsurf_core::math::interpolators::BilinearInterpolator;
//!
//! let xs = [0.0_f64, 1.0];
//! let ys = [0.0, 1.0];
//! let zs = [&[0.0, 2.0][..], &[2.0, 4.0][..]];
//!
//! let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
//! assert!((interp.interpolate(0.5, 0.5).unwrap() - 2.0).abs() < 1e-12);
//! assert!((interp.interpolate_clamped(5.0, 5.0) - 4.0).abs() < 1e-12);
//! ```

mod bilinear;

// Re-export public types at module level
pub use bilinear::BilinearInterpolator;
