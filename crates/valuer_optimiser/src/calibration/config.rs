//! Calibration configuration.

use std::time::Duration;
use valuer_core::Coefficient;

use super::error::CalibrationError;

/// Knobs for the coordinate-descent search.
///
/// Step sizes are fractions of each coefficient's bound width, so one
/// configuration works across coefficients with very different ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationConfig {
    /// Aggregate RMS relative error at which the search stops.
    pub tolerance: f64,
    /// Maximum number of sweeps over the free coefficients.
    pub max_iterations: usize,
    /// Starting step as a fraction of the bound width.
    pub initial_step: f64,
    /// Factor applied to every step after a sweep with no accepted move.
    pub step_shrink: f64,
    /// Smallest useful step as a fraction of the bound width.
    pub min_step: f64,
    /// Coefficients the search may move, in sweep order.
    pub free: Vec<Coefficient>,
    /// Optional wall-clock limit.
    pub deadline: Option<Duration>,
    /// Evaluate cases on the rayon pool when the `parallel` feature is on.
    pub parallel: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 500,
            initial_step: 0.1,
            step_shrink: 0.5,
            min_step: 1e-12,
            free: Coefficient::ALL.to_vec(),
            deadline: None,
            parallel: true,
        }
    }
}

impl CalibrationConfig {
    /// Create a configuration with the given tolerance and sweep budget.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Default::default()
        }
    }

    /// Set the initial step fraction.
    pub fn with_initial_step(mut self, initial_step: f64) -> Self {
        self.initial_step = initial_step;
        self
    }

    /// Set the shrink factor.
    pub fn with_step_shrink(mut self, step_shrink: f64) -> Self {
        self.step_shrink = step_shrink;
        self
    }

    /// Set the minimum step fraction.
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    /// Restrict the search to `free` coefficients; the rest stay at their
    /// initial values.
    pub fn with_free(mut self, free: impl IntoIterator<Item = Coefficient>) -> Self {
        self.free = free.into_iter().collect();
        self
    }

    /// Set a wall-clock deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Enable or disable parallel case evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(CalibrationError::invalid_input(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if !(self.initial_step > 0.0 && self.initial_step <= 1.0) {
            return Err(CalibrationError::invalid_input(format!(
                "initial_step must be in (0, 1], got {}",
                self.initial_step
            )));
        }
        if !(self.step_shrink > 0.0 && self.step_shrink < 1.0) {
            return Err(CalibrationError::invalid_input(format!(
                "step_shrink must be in (0, 1), got {}",
                self.step_shrink
            )));
        }
        if !(self.min_step > 0.0 && self.min_step < self.initial_step) {
            return Err(CalibrationError::invalid_input(format!(
                "min_step must be in (0, initial_step), got {}",
                self.min_step
            )));
        }
        if self.free.is_empty() {
            return Err(CalibrationError::invalid_input(
                "at least one coefficient must be free",
            ));
        }
        for (i, c) in self.free.iter().enumerate() {
            if self.free[..i].contains(c) {
                return Err(CalibrationError::invalid_input(format!(
                    "coefficient '{}' listed twice",
                    c
                )));
            }
        }
        Ok(())
    }
}
