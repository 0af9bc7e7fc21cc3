//! Attribution engine.

use valuer_core::params::ParameterDifference;
use valuer_core::{CoefficientSet, ParameterSet, ValuationError};
use valuer_models::{ValuationResult, Valuer};

use super::method::AttributionMethod;
use super::report::{AttributionEntry, AttributionReport};

/// Explains the difference between two valued scenarios.
///
/// Generic over the [`Valuer`] used to value probe scenarios; probes are
/// valued with the same coefficient set the caller used for both results.
#[derive(Clone, Debug)]
pub struct AttributionEngine<V: Valuer> {
    valuer: V,
    method: AttributionMethod,
}

impl<V: Valuer> AttributionEngine<V> {
    /// Create an engine using one-at-a-time substitution.
    pub fn new(valuer: V) -> Self {
        Self {
            valuer,
            method: AttributionMethod::default(),
        }
    }

    /// Use a different attribution method.
    pub fn with_method(mut self, method: AttributionMethod) -> Self {
        self.method = method;
        self
    }

    /// Configured method.
    pub fn method(&self) -> AttributionMethod {
        self.method
    }

    /// Underlying valuer.
    pub fn valuer(&self) -> &V {
        &self.valuer
    }

    /// Attribute `variant_result.total − baseline_result.total` to the
    /// parameters that differ between the two sets.
    ///
    /// # Errors
    ///
    /// - `ParameterSetMismatch` when the sets hold different keys, or when a
    ///   result was not produced from the set passed beside it
    /// - any error from valuing a probe scenario, unchanged
    pub fn attribute(
        &self,
        coefficients: &CoefficientSet,
        baseline_params: &ParameterSet,
        baseline_result: &ValuationResult,
        variant_params: &ParameterSet,
        variant_result: &ValuationResult,
    ) -> Result<AttributionReport, ValuationError> {
        if baseline_result.parameters() != baseline_params {
            return Err(ValuationError::mismatch(
                "baseline result was not produced from the baseline parameter set",
            ));
        }
        if variant_result.parameters() != variant_params {
            return Err(ValuationError::mismatch(
                "variant result was not produced from the variant parameter set",
            ));
        }

        let differences = baseline_params.differences(variant_params)?;
        let baseline_total = baseline_result.total_valuation();
        let variant_total = variant_result.total_valuation();

        let entries = match self.method {
            AttributionMethod::OneAtATime => {
                self.one_at_a_time(coefficients, baseline_params, baseline_total, &differences)?
            }
            AttributionMethod::Sequential => {
                self.sequential(coefficients, baseline_params, baseline_total, &differences)?
            }
        };

        let report = AttributionReport::new(self.method, baseline_total, variant_total, entries);
        tracing::debug!(
            method = %self.method,
            differing = report.entries().len(),
            total_delta = report.total_delta(),
            residual = report.residual(),
            "attribution complete"
        );
        Ok(report)
    }

    fn one_at_a_time(
        &self,
        coefficients: &CoefficientSet,
        baseline_params: &ParameterSet,
        baseline_total: f64,
        differences: &[ParameterDifference],
    ) -> Result<Vec<AttributionEntry>, ValuationError> {
        differences
            .iter()
            .map(|diff| {
                let probe = baseline_params.with_value(&diff.key, diff.after)?;
                let probe_total = self.valuer.total_valuation(&probe, coefficients)?;
                let contribution = probe_total - baseline_total;
                tracing::debug!(key = %diff.key, contribution, "attribution probe");
                Ok(entry(diff, contribution))
            })
            .collect()
    }

    fn sequential(
        &self,
        coefficients: &CoefficientSet,
        baseline_params: &ParameterSet,
        baseline_total: f64,
        differences: &[ParameterDifference],
    ) -> Result<Vec<AttributionEntry>, ValuationError> {
        let mut current = baseline_params.clone();
        let mut previous_total = baseline_total;
        let mut entries = Vec::with_capacity(differences.len());

        for diff in differences {
            current = current.with_value(&diff.key, diff.after)?;
            let step_total = self.valuer.total_valuation(&current, coefficients)?;
            let contribution = step_total - previous_total;
            tracing::debug!(key = %diff.key, contribution, "attribution step");
            entries.push(entry(diff, contribution));
            previous_total = step_total;
        }
        Ok(entries)
    }
}

fn entry(diff: &ParameterDifference, contribution: f64) -> AttributionEntry {
    AttributionEntry {
        key: diff.key.clone(),
        baseline_value: diff.before,
        variant_value: diff.after,
        contribution,
    }
}
