//! Implied volatility solver configuration.

use super::ImpliedVolError;

/// Configuration for implied volatility inversion.
///
/// Defaults follow the usual Black implied volatility settings:
/// accuracy 1e-6, at most 100 evaluations, volatility searched in
/// `[1e-4, 5.0]`.
///
/// # Example
///
/// ```
/// use volsurf_models::ImpliedVolConfig;
///
/// let config = ImpliedVolConfig::default();
/// assert_eq!(config.vol_min, 1e-4);
/// assert_eq!(config.vol_max, 5.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImpliedVolConfig {
    /// Lower end of the volatility bracket.
    pub vol_min: f64,
    /// Upper end of the volatility bracket.
    pub vol_max: f64,
    /// Absolute accuracy on the volatility.
    pub tolerance: f64,
    /// Maximum number of Brent iterations.
    pub max_iterations: usize,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        Self {
            vol_min: 1e-4,
            vol_max: 5.0,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl ImpliedVolConfig {
    /// Checks the bracket and accuracy settings.
    ///
    /// # Errors
    /// `ImpliedVolError::InvalidInput` when the bracket is empty or not
    /// positive, the tolerance is not positive, or `max_iterations` is zero.
    pub fn validate(&self) -> Result<(), ImpliedVolError> {
        if !(self.vol_min > 0.0) || !self.vol_max.is_finite() || self.vol_min >= self.vol_max {
            return Err(ImpliedVolError::InvalidInput(format!(
                "volatility bracket [{}, {}] must satisfy 0 < vol_min < vol_max",
                self.vol_min, self.vol_max
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(ImpliedVolError::InvalidInput(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(ImpliedVolError::InvalidInput(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ImpliedVolConfig::default();
        assert_eq!(config.vol_min, 1e-4);
        assert_eq!(config.vol_max, 5.0);
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.max_iterations, 100);
    }

    #[test]
    fn test_validate_rejects_empty_bracket() {
        let config = ImpliedVolConfig {
            vol_min: 2.0,
            vol_max: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ImpliedVolError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_rejects_zero_vol_min() {
        let config = ImpliedVolConfig {
            vol_min: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_tolerance_and_iterations() {
        let config = ImpliedVolConfig {
            tolerance: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ImpliedVolConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
