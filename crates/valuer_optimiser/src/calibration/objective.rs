//! Calibration objective: RMS relative error over a batch of cases.

use serde::Serialize;
use valuer_core::{CoefficientSet, ValuationError};
use valuer_models::Valuer;

use super::case::CalibrationCase;
use super::error::CalibrationError;

/// Error of one case under a candidate coefficient set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CaseError {
    /// Case identifier
    pub id: String,
    /// RMS relative error over the case's figures
    pub error: f64,
    /// Per-case tolerance override, if any
    pub tolerance: Option<f64>,
    #[serde(skip)]
    squared_sum: f64,
    #[serde(skip)]
    figures: usize,
}

impl CaseError {
    fn from_errors(case: &CalibrationCase, errors: &[f64]) -> Self {
        let squared_sum: f64 = errors.iter().map(|e| e * e).sum();
        let figures = errors.len();
        Self {
            id: case.id.clone(),
            error: rms(squared_sum, figures),
            tolerance: case.tolerance,
            squared_sum,
            figures,
        }
    }

    /// Every figure of `case` counted as infinitely wrong.
    fn overflowed(case: &CalibrationCase) -> Self {
        Self {
            id: case.id.clone(),
            error: f64::INFINITY,
            tolerance: case.tolerance,
            squared_sum: f64::INFINITY,
            figures: case.expected.figure_count(),
        }
    }

    /// Whether the case meets its own tolerance (always true without one).
    pub fn within_override(&self) -> bool {
        self.tolerance.map_or(true, |tol| self.error <= tol)
    }
}

/// Batch evaluation under one coefficient set.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// RMS relative error across every compared figure of every case
    pub aggregate: f64,
    /// Per-case errors in case order
    pub cases: Vec<CaseError>,
}

impl Evaluation {
    fn from_cases(cases: Vec<CaseError>) -> Self {
        let (squared_sum, figures) = cases
            .iter()
            .fold((0.0, 0usize), |(s, n), c| (s + c.squared_sum, n + c.figures));
        Self {
            aggregate: rms(squared_sum, figures),
            cases,
        }
    }

    /// Aggregate within `tolerance` and every override satisfied.
    pub fn is_converged(&self, tolerance: f64) -> bool {
        self.aggregate <= tolerance && self.cases.iter().all(CaseError::within_override)
    }

    /// Worst single-case error.
    pub fn max_case_error(&self) -> f64 {
        self.cases.iter().map(|c| c.error).fold(0.0, f64::max)
    }
}

/// NaN counts as infinitely bad so it can never be accepted as an improvement.
fn rms(squared_sum: f64, figures: usize) -> f64 {
    if figures == 0 {
        return 0.0;
    }
    let value = (squared_sum / figures as f64).sqrt();
    if value.is_nan() {
        f64::INFINITY
    } else {
        value
    }
}

/// Evaluates a batch of cases against a valuer.
pub struct Objective<'a, V: Valuer> {
    valuer: &'a V,
    cases: &'a [CalibrationCase],
    parallel: bool,
}

impl<'a, V: Valuer> Objective<'a, V> {
    /// Create an objective over `cases`.
    pub fn new(valuer: &'a V, cases: &'a [CalibrationCase], parallel: bool) -> Self {
        Self {
            valuer,
            cases,
            parallel,
        }
    }

    /// Number of cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether there are no cases.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Value every case under `coefficients`.
    ///
    /// # Errors
    ///
    /// The first failure in case order, whether cases run in parallel or not.
    /// `NonFinite` is not a failure: the case scores as infinite error.
    pub fn evaluate(&self, coefficients: &CoefficientSet) -> Result<Evaluation, CalibrationError> {
        let cases = if self.parallel {
            self.evaluate_parallel(coefficients)?
        } else {
            self.evaluate_sequential(coefficients)?
        };
        Ok(Evaluation::from_cases(cases))
    }

    fn evaluate_case(
        &self,
        case: &CalibrationCase,
        coefficients: &CoefficientSet,
    ) -> Result<CaseError, CalibrationError> {
        match self.valuer.compute(&case.parameters, coefficients) {
            Ok(result) => {
                let errors = case.relative_errors(&result)?;
                Ok(CaseError::from_errors(case, &errors))
            }
            // Overflow under these coefficients is a bad fit, not a bad case.
            Err(ValuationError::NonFinite { quantity }) => {
                tracing::debug!(case = %case.id, %quantity, "calibration case overflowed");
                Ok(CaseError::overflowed(case))
            }
            Err(e) => {
                tracing::warn!(case = %case.id, error = %e, "calibration case failed");
                Err(CalibrationError::from(e))
            }
        }
    }

    fn evaluate_sequential(
        &self,
        coefficients: &CoefficientSet,
    ) -> Result<Vec<CaseError>, CalibrationError> {
        self.cases
            .iter()
            .map(|case| self.evaluate_case(case, coefficients))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn evaluate_parallel(
        &self,
        coefficients: &CoefficientSet,
    ) -> Result<Vec<CaseError>, CalibrationError> {
        use rayon::prelude::*;

        // Collected whole and then scanned in order, so the reported error
        // does not depend on thread scheduling.
        let results: Vec<Result<CaseError, CalibrationError>> = self
            .cases
            .par_iter()
            .map(|case| self.evaluate_case(case, coefficients))
            .collect();
        results.into_iter().collect()
    }

    /// Fallback to sequential when parallel feature is disabled.
    #[cfg(not(feature = "parallel"))]
    fn evaluate_parallel(
        &self,
        coefficients: &CoefficientSet,
    ) -> Result<Vec<CaseError>, CalibrationError> {
        self.evaluate_sequential(coefficients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn case_error(id: &str, errors: &[f64], tolerance: Option<f64>) -> CaseError {
        let squared_sum: f64 = errors.iter().map(|e| e * e).sum();
        CaseError {
            id: id.to_string(),
            error: rms(squared_sum, errors.len()),
            tolerance,
            squared_sum,
            figures: errors.len(),
        }
    }

    #[test]
    fn test_aggregate_weights_by_figure_count() {
        // One scalar case and one three-figure case: the aggregate is the RMS
        // over all four figures, not the mean of the case errors.
        let eval = Evaluation::from_cases(vec![
            case_error("a", &[0.4], None),
            case_error("b", &[0.0, 0.0, 0.0], None),
        ]);
        assert_relative_eq!(eval.aggregate, 0.2);
        assert_relative_eq!(eval.max_case_error(), 0.4);
    }

    #[test]
    fn test_override_blocks_convergence() {
        let eval = Evaluation::from_cases(vec![
            case_error("a", &[0.01], Some(0.05)),
            case_error("b", &[0.0], None),
        ]);
        assert!(eval.is_converged(0.01));
        let strict = Evaluation::from_cases(vec![
            case_error("a", &[0.01], Some(0.001)),
            case_error("b", &[0.0; 10], None),
        ]);
        assert!(strict.aggregate < 0.01);
        assert!(!strict.cases[0].within_override());
        assert!(!strict.is_converged(0.01));
    }

    #[test]
    fn test_overflowed_case_poisons_aggregate() {
        let eval = Evaluation::from_cases(vec![
            case_error("a", &[0.0], None),
            CaseError {
                id: "b".to_string(),
                error: f64::INFINITY,
                tolerance: None,
                squared_sum: f64::INFINITY,
                figures: 1,
            },
        ]);
        assert_eq!(eval.aggregate, f64::INFINITY);
        assert!(!eval.is_converged(f64::MAX));
    }

    #[test]
    fn test_nan_is_infinitely_bad() {
        assert_eq!(rms(f64::NAN, 1), f64::INFINITY);
        assert_eq!(rms(0.0, 0), 0.0);
    }
}
