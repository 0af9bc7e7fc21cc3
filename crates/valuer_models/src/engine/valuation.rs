//! The valuation engine.

use valuer_core::{CoefficientSet, ParameterSet, ValuationError};

use super::config::EngineConfig;
use super::projection::{project, ScenarioInputs};
use super::terminal::{ensure_convergent, perpetuity_value};
use crate::result::ValuationResult;
use crate::traits::Valuer;

/// Deterministic discounted-cash-flow valuation engine.
///
/// Holds only its horizon configuration; coefficients are passed to every
/// call, so one engine can be shared by any number of readers.
///
/// # Example
///
/// ```
/// use valuer_core::params::ParameterSchema;
/// use valuer_core::{CoefficientSet, ParameterSet};
/// use valuer_models::{EngineConfig, ValuationEngine};
///
/// let params = ParameterSet::builder(ParameterSchema::standard())
///     .set("financial", "discount_rate", 0.10)
///     .set("financial", "terminal_growth", 0.03)
///     .set("financial", "dilution_factor", 1.0)
///     .set("market", "market_volume", 1_000_000.0)
///     .set("market", "penetration_rate", 0.05)
///     .set("market", "price_per_unit", 120.0)
///     .set("market", "volume_growth", 0.04)
///     .set("market", "price_growth", 0.02)
///     .build()
///     .unwrap();
///
/// let engine = ValuationEngine::new(EngineConfig::default()).unwrap();
/// let result = engine.compute(&params, &CoefficientSet::standard()).unwrap();
///
/// assert_eq!(result.horizon(), 10);
/// assert!(result.total_valuation() > result.present_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationEngine {
    config: EngineConfig,
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
}

impl ValuationEngine {
    /// Create an engine with a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ValuationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Value one scenario.
    ///
    /// # Errors
    ///
    /// - `MissingParameter` for the first absent key in declaration order
    /// - `InvalidParameter` for out-of-range values, or when
    ///   `discount_rate <= terminal_growth`
    /// - `NonFinite` when a figure overflows
    pub fn compute(
        &self,
        params: &ParameterSet,
        coefficients: &CoefficientSet,
    ) -> Result<ValuationResult, ValuationError> {
        let inputs = ScenarioInputs::from_params(params)?;
        ensure_convergent(inputs.discount_rate, inputs.terminal_growth)?;

        let periods = project(&inputs, coefficients, &self.config)?;

        let length = self.config.period_length_years;
        let terminal_cash_flow = periods.last().map_or(0.0, |p| p.cash_flow);
        let terminal_value = perpetuity_value(
            terminal_cash_flow,
            inputs.discount_rate,
            inputs.terminal_growth,
            length,
        )?;
        let discounted_terminal_value =
            terminal_value * (1.0 + inputs.discount_rate).powf(-self.config.horizon_years());

        let result = ValuationResult::new(
            periods,
            terminal_value,
            discounted_terminal_value,
            params.clone(),
        );
        if !result.total_valuation().is_finite() {
            return Err(ValuationError::non_finite("total valuation"));
        }
        Ok(result)
    }
}

impl Valuer for ValuationEngine {
    fn compute(
        &self,
        params: &ParameterSet,
        coefficients: &CoefficientSet,
    ) -> Result<ValuationResult, ValuationError> {
        ValuationEngine::compute(self, params, coefficients)
    }
}
