//! Engine configuration types.

use serde::{Deserialize, Serialize};
use valuer_core::ValuationError;

/// Projection horizon of the valuation engine.
///
/// Both the period count and the period length are explicit; nothing about
/// the horizon is inferred from the parameters.
///
/// # Example
///
/// ```
/// use valuer_models::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.horizon_periods, 10);
/// assert_eq!(config.period_length_years, 1.0);
///
/// let quarterly = EngineConfig::new(20, 0.25).unwrap();
/// assert_eq!(quarterly.horizon_years(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of explicit projection periods.
    pub horizon_periods: usize,
    /// Length of one period in years.
    pub period_length_years: f64,
}

impl Default for EngineConfig {
    /// Ten annual periods.
    fn default() -> Self {
        Self {
            horizon_periods: 10,
            period_length_years: 1.0,
        }
    }
}

impl EngineConfig {
    /// Create a validated configuration.
    pub fn new(horizon_periods: usize, period_length_years: f64) -> Result<Self, ValuationError> {
        let config = Self {
            horizon_periods,
            period_length_years,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the horizon is usable.
    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.horizon_periods == 0 {
            return Err(ValuationError::InvalidConfig(
                "horizon_periods must be > 0".to_string(),
            ));
        }
        if !(self.period_length_years.is_finite() && self.period_length_years > 0.0) {
            return Err(ValuationError::InvalidConfig(format!(
                "period_length_years must be positive, got {}",
                self.period_length_years
            )));
        }
        Ok(())
    }

    /// Total horizon length in years.
    pub fn horizon_years(&self) -> f64 {
        self.horizon_periods as f64 * self.period_length_years
    }
}
