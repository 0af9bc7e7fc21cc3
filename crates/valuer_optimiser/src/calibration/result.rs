//! Calibration outcome.

use serde::Serialize;
use std::time::Duration;
use valuer_core::CoefficientSet;

use super::objective::CaseError;

/// Result of a converged calibration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalibrationOutcome {
    /// Calibrated coefficients
    pub coefficients: CoefficientSet,
    /// Final aggregate RMS relative error
    pub aggregate_error: f64,
    /// Per-case errors at the calibrated coefficients, in case order
    pub case_errors: Vec<CaseError>,
    /// Sweeps performed
    pub iterations: usize,
    /// Aggregate error after the initial evaluation and after every accepted
    /// move; never increases
    pub history: Vec<f64>,
    /// Wall-clock time spent
    pub elapsed: Duration,
}

impl CalibrationOutcome {
    /// Get the calibrated coefficients.
    pub fn coefficients(&self) -> &CoefficientSet {
        &self.coefficients
    }

    /// Number of accepted moves.
    pub fn accepted_moves(&self) -> usize {
        self.history.len().saturating_sub(1)
    }

    /// Worst single-case error.
    pub fn max_case_error(&self) -> f64 {
        self.case_errors.iter().map(|c| c.error).fold(0.0, f64::max)
    }

    /// Error reduction from the starting coefficients.
    pub fn improvement(&self) -> f64 {
        match (self.history.first(), self.history.last()) {
            (Some(first), Some(last)) => first - last,
            _ => 0.0,
        }
    }
}
