//! Coordinate-descent coefficient search.

use std::collections::BTreeSet;
use std::time::Instant;

use valuer_core::{Coefficient, CoefficientSet};
use valuer_models::Valuer;

use super::case::CalibrationCase;
use super::config::CalibrationConfig;
use super::error::{CalibrationError, DivergenceReason};
use super::objective::{Evaluation, Objective};
use super::result::CalibrationOutcome;

/// Bounded coordinate-descent calibrator.
///
/// Each sweep visits the free coefficients in order and tries a step up,
/// then a step down, keeping a move only when it strictly lowers the
/// aggregate error. A sweep without any accepted move halves (by
/// `step_shrink`) every step. The search is deterministic: the same inputs
/// always visit the same candidates.
///
/// # Example
///
/// ```
/// use valuer_core::params::ParameterSchema;
/// use valuer_core::{Coefficient, CoefficientSet, ParameterSet};
/// use valuer_models::ValuationEngine;
/// use valuer_optimiser::{CalibrationCase, CalibrationConfig, CoordinateDescentCalibrator};
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
/// let engine = ValuationEngine::default();
/// let target = CoefficientSet::standard()
///     .with_value(Coefficient::CashConversion, 0.3)
///     .unwrap();
/// let expected = engine.compute(&params, &target).unwrap().total_valuation();
/// let cases = vec![CalibrationCase::total("base", params, expected)];
///
/// let config = CalibrationConfig::new(1e-8, 200).with_free([Coefficient::CashConversion]);
/// let outcome = CoordinateDescentCalibrator::new(&engine, config)
///     .calibrate(&cases, &CoefficientSet::standard())
///     .unwrap();
///
/// assert!(outcome.aggregate_error <= 1e-8);
/// ```
#[derive(Debug, Clone)]
pub struct CoordinateDescentCalibrator<V: Valuer> {
    valuer: V,
    config: CalibrationConfig,
}

impl<V: Valuer> CoordinateDescentCalibrator<V> {
    /// Create a calibrator.
    pub fn new(valuer: V, config: CalibrationConfig) -> Self {
        Self { valuer, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Search for coefficients that reproduce `cases`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty batch, duplicate or malformed cases, or
    ///   an unusable configuration
    /// - `Valuation` with the first case failure in case order; a case that
    ///   overflows under a candidate only scores as infinite error
    /// - `Divergence` when the search stops above tolerance
    pub fn calibrate(
        &self,
        cases: &[CalibrationCase],
        initial: &CoefficientSet,
    ) -> Result<CalibrationOutcome, CalibrationError> {
        let config = &self.config;
        config.validate()?;
        validate_cases(cases)?;

        let started = Instant::now();
        let objective = Objective::new(&self.valuer, cases, config.parallel);

        let mut best = *initial;
        let mut evaluation = objective.evaluate(&best)?;
        let mut history = vec![evaluation.aggregate];
        let mut steps: Vec<Step> = config
            .free
            .iter()
            .map(|&c| Step::new(c, config.initial_step, config.min_step))
            .collect();
        let mut iterations = 0;

        tracing::debug!(
            cases = cases.len(),
            initial_error = evaluation.aggregate,
            "calibration started"
        );

        loop {
            if evaluation.is_converged(config.tolerance) {
                tracing::info!(
                    iterations,
                    error = evaluation.aggregate,
                    "calibration converged"
                );
                return Ok(CalibrationOutcome {
                    coefficients: best,
                    aggregate_error: evaluation.aggregate,
                    case_errors: evaluation.cases,
                    iterations,
                    history,
                    elapsed: started.elapsed(),
                });
            }

            let stop = if iterations >= config.max_iterations {
                Some(DivergenceReason::MaxIterations)
            } else if steps.iter().all(Step::is_exhausted) {
                Some(DivergenceReason::StepExhausted)
            } else if config.deadline.is_some_and(|d| started.elapsed() >= d) {
                Some(DivergenceReason::Deadline)
            } else {
                None
            };
            if let Some(reason) = stop {
                tracing::warn!(
                    iterations,
                    best_error = evaluation.aggregate,
                    %reason,
                    "calibration diverged"
                );
                return Err(CalibrationError::divergence(
                    evaluation.aggregate,
                    iterations,
                    best,
                    reason,
                ));
            }

            iterations += 1;
            let mut accepted = false;
            for step in &steps {
                if let Some((candidate, candidate_eval)) =
                    try_step(&objective, &best, &evaluation, step)?
                {
                    best = candidate;
                    evaluation = candidate_eval;
                    history.push(evaluation.aggregate);
                    accepted = true;
                }
            }
            if !accepted {
                for step in &mut steps {
                    step.shrink(config.step_shrink);
                }
            }

            tracing::debug!(
                iteration = iterations,
                error = evaluation.aggregate,
                accepted,
                "calibration sweep"
            );
        }
    }
}

/// Calibrate with default knobs apart from `tolerance` and `max_iterations`,
/// returning only the coefficients.
pub fn calibrate<V: Valuer>(
    valuer: &V,
    cases: &[CalibrationCase],
    initial: &CoefficientSet,
    tolerance: f64,
    max_iterations: usize,
) -> Result<CoefficientSet, CalibrationError> {
    CoordinateDescentCalibrator::new(valuer, CalibrationConfig::new(tolerance, max_iterations))
        .calibrate(cases, initial)
        .map(|outcome| outcome.coefficients)
}

fn validate_cases(cases: &[CalibrationCase]) -> Result<(), CalibrationError> {
    if cases.is_empty() {
        return Err(CalibrationError::invalid_input("no calibration cases"));
    }
    let mut seen = BTreeSet::new();
    for case in cases {
        case.validate()?;
        if !seen.insert(case.id.as_str()) {
            return Err(CalibrationError::invalid_input(format!(
                "duplicate case id '{}'",
                case.id
            )));
        }
    }
    Ok(())
}

/// Current step for one free coefficient, in coefficient units.
#[derive(Debug, Clone, Copy)]
struct Step {
    coefficient: Coefficient,
    size: f64,
    floor: f64,
}

impl Step {
    fn new(coefficient: Coefficient, initial_fraction: f64, min_fraction: f64) -> Self {
        let width = coefficient.bounds().width().unwrap_or(1.0);
        Self {
            coefficient,
            size: initial_fraction * width,
            floor: min_fraction * width,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.size < self.floor
    }

    fn shrink(&mut self, factor: f64) {
        self.size *= factor;
    }
}

/// Try `+size` then `−size`; return the first strictly better candidate.
fn try_step<V: Valuer>(
    objective: &Objective<'_, V>,
    current: &CoefficientSet,
    current_eval: &Evaluation,
    step: &Step,
) -> Result<Option<(CoefficientSet, Evaluation)>, CalibrationError> {
    if step.is_exhausted() {
        return Ok(None);
    }
    let value = current.get(step.coefficient);
    for direction in [1.0, -1.0] {
        let candidate = current.with_clamped(step.coefficient, value + direction * step.size);
        if candidate.get(step.coefficient).to_bits() == value.to_bits() {
            continue;
        }
        let evaluation = objective.evaluate(&candidate)?;
        if evaluation.aggregate < current_eval.aggregate {
            return Ok(Some((candidate, evaluation)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuer_core::params::standard::*;
    use valuer_core::params::ParameterSchema;
    use valuer_core::ParameterSet;
    use valuer_models::ValuationEngine;

    fn params() -> ParameterSet {
        ParameterSet::builder(ParameterSchema::standard())
            .set(FINANCIAL, DISCOUNT_RATE, 0.10)
            .set(FINANCIAL, TERMINAL_GROWTH, 0.03)
            .set(FINANCIAL, DILUTION_FACTOR, 1.0)
            .set(MARKET, MARKET_VOLUME, 1_000_000.0)
            .set(MARKET, PENETRATION_RATE, 0.05)
            .set(MARKET, PRICE_PER_UNIT, 120.0)
            .set(MARKET, VOLUME_GROWTH, 0.04)
            .set(MARKET, PRICE_GROWTH, 0.02)
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_cases_rejected() {
        let engine = ValuationEngine::default();
        let err = CoordinateDescentCalibrator::new(&engine, CalibrationConfig::default())
            .calibrate(&[], &CoefficientSet::standard())
            .unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidInput { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let cases = vec![
            CalibrationCase::total("x", params(), 1.0),
            CalibrationCase::total("x", params(), 2.0),
        ];
        let err = validate_cases(&cases).unwrap_err();
        assert!(format!("{}", err).contains("duplicate"));
    }

    #[test]
    fn test_already_calibrated_returns_without_sweeping() {
        let engine = ValuationEngine::default();
        let coefficients = CoefficientSet::standard();
        let total = engine.compute(&params(), &coefficients).unwrap().total_valuation();
        let cases = vec![CalibrationCase::total("base", params(), total)];

        let outcome = CoordinateDescentCalibrator::new(&engine, CalibrationConfig::default())
            .calibrate(&cases, &coefficients)
            .unwrap();
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.coefficients, coefficients);
        assert_eq!(outcome.history, vec![0.0]);
    }

    #[test]
    fn test_zero_budget_diverges_with_initial_coefficients() {
        let engine = ValuationEngine::default();
        let cases = vec![CalibrationCase::total("base", params(), 1.0)];
        let err = CoordinateDescentCalibrator::new(&engine, CalibrationConfig::new(1e-9, 0))
            .calibrate(&cases, &CoefficientSet::standard())
            .unwrap_err();
        match err {
            CalibrationError::Divergence {
                iterations,
                coefficients,
                reason,
                ..
            } => {
                assert_eq!(iterations, 0);
                assert_eq!(coefficients, CoefficientSet::standard());
                assert_eq!(reason, DivergenceReason::MaxIterations);
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn test_step_floor_scales_with_width() {
        let step = Step::new(Coefficient::AdoptionSpeed, 0.1, 1e-6);
        assert!((step.size - 4.999).abs() < 1e-9);
        assert!(!step.is_exhausted());
    }
}
