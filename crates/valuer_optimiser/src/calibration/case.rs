//! Calibration cases.
//!
//! A case pairs a full parameter set with what a trusted reference says the
//! engine should produce for it.

use serde::{Deserialize, Serialize};
use valuer_core::ParameterSet;
use valuer_models::ValuationResult;

use super::error::CalibrationError;

/// Full expected valuation for one case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedValuation {
    /// Per-period cash flows, one per horizon period
    pub cash_flows: Vec<f64>,
    /// Present value of the explicit horizon
    pub present_value: f64,
    /// Undiscounted terminal value at the horizon
    pub terminal_value: f64,
    /// Total valuation
    pub total_valuation: f64,
}

impl ExpectedValuation {
    /// Expected figures copied from a computed result.
    pub fn from_result(result: &ValuationResult) -> Self {
        Self {
            cash_flows: result.cash_flows(),
            present_value: result.present_value(),
            terminal_value: result.terminal_value(),
            total_valuation: result.total_valuation(),
        }
    }
}

/// What the reference expects for a case.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedOutcome {
    /// Only the total valuation is known.
    Total(f64),
    /// Every reported figure is known.
    Full(ExpectedValuation),
}

impl ExpectedOutcome {
    /// Expected total valuation.
    pub fn total(&self) -> f64 {
        match self {
            ExpectedOutcome::Total(total) => *total,
            ExpectedOutcome::Full(full) => full.total_valuation,
        }
    }

    /// Number of figures compared against a computed result.
    pub fn figure_count(&self) -> usize {
        match self {
            ExpectedOutcome::Total(_) => 1,
            ExpectedOutcome::Full(full) => 3 + full.cash_flows.len(),
        }
    }

    fn all_finite(&self) -> bool {
        match self {
            ExpectedOutcome::Total(total) => total.is_finite(),
            ExpectedOutcome::Full(full) => {
                full.present_value.is_finite()
                    && full.terminal_value.is_finite()
                    && full.total_valuation.is_finite()
                    && full.cash_flows.iter().all(|cf| cf.is_finite())
            }
        }
    }
}

/// Relative error of `computed` against `expected`.
///
/// Falls back to the absolute difference when `expected` is zero.
#[inline]
pub fn relative_error(computed: f64, expected: f64) -> f64 {
    if expected == 0.0 {
        computed - expected
    } else {
        (computed - expected) / expected.abs()
    }
}

/// One reference record: inputs, expected outputs and an optional
/// per-case tolerance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalibrationCase {
    /// Case identifier, unique within a batch
    pub id: String,
    /// Scenario inputs
    pub parameters: ParameterSet,
    /// Reference outputs
    pub expected: ExpectedOutcome,
    /// Relative error this case must reach, in addition to the aggregate
    pub tolerance: Option<f64>,
}

impl CalibrationCase {
    /// Case compared on its total valuation.
    pub fn total(id: impl Into<String>, parameters: ParameterSet, expected_total: f64) -> Self {
        Self {
            id: id.into(),
            parameters,
            expected: ExpectedOutcome::Total(expected_total),
            tolerance: None,
        }
    }

    /// Case compared on every figure.
    pub fn full(id: impl Into<String>, parameters: ParameterSet, expected: ExpectedValuation) -> Self {
        Self {
            id: id.into(),
            parameters,
            expected: ExpectedOutcome::Full(expected),
            tolerance: None,
        }
    }

    /// Set a per-case tolerance override.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Check the case is usable.
    ///
    /// Parameter completeness is left to the engine, so a missing key is
    /// reported with the engine's own error.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.id.trim().is_empty() {
            return Err(CalibrationError::invalid_input("case id must not be empty"));
        }
        if !self.expected.all_finite() {
            return Err(CalibrationError::invalid_input(format!(
                "case '{}': expected values must be finite",
                self.id
            )));
        }
        if let Some(tol) = self.tolerance {
            if !tol.is_finite() || tol < 0.0 {
                return Err(CalibrationError::invalid_input(format!(
                    "case '{}': tolerance must be a non-negative number, got {}",
                    self.id, tol
                )));
            }
        }
        Ok(())
    }

    /// Signed relative errors of `result` against the expected figures.
    ///
    /// Full cases yield total, present value, terminal value, then each
    /// cash flow in period order.
    pub fn relative_errors(&self, result: &ValuationResult) -> Result<Vec<f64>, CalibrationError> {
        match &self.expected {
            ExpectedOutcome::Total(total) => {
                Ok(vec![relative_error(result.total_valuation(), *total)])
            }
            ExpectedOutcome::Full(full) => {
                if full.cash_flows.len() != result.horizon() {
                    return Err(CalibrationError::invalid_input(format!(
                        "case '{}': expected {} cash flows but the engine horizon is {}",
                        self.id,
                        full.cash_flows.len(),
                        result.horizon()
                    )));
                }
                let mut errors = Vec::with_capacity(self.expected.figure_count());
                errors.push(relative_error(result.total_valuation(), full.total_valuation));
                errors.push(relative_error(result.present_value(), full.present_value));
                errors.push(relative_error(result.terminal_value(), full.terminal_value));
                errors.extend(
                    result
                        .periods()
                        .iter()
                        .zip(&full.cash_flows)
                        .map(|(p, expected)| relative_error(p.cash_flow, *expected)),
                );
                Ok(errors)
            }
        }
    }
}
