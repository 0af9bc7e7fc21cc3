//! Calibration error types.

use std::fmt;
use thiserror::Error;
use valuer_core::{CoefficientSet, ValuationError};

/// Why a calibration run stopped without converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceReason {
    /// The sweep budget was used up.
    MaxIterations,
    /// Every step shrank below the minimum step.
    StepExhausted,
    /// The wall-clock deadline passed.
    Deadline,
}

impl fmt::Display for DivergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DivergenceReason::MaxIterations => "iteration limit reached",
            DivergenceReason::StepExhausted => "step size exhausted",
            DivergenceReason::Deadline => "deadline passed",
        })
    }
}

/// Errors from a calibration run.
///
/// # Variants
///
/// - `Divergence`: tolerance was not met; carries the best coefficients found
/// - `InvalidInput`: unusable cases or configuration
/// - `Valuation`: a case could not be valued; the engine's error, unchanged
///
/// # Examples
///
/// ```
/// use valuer_core::CoefficientSet;
/// use valuer_optimiser::{CalibrationError, DivergenceReason};
///
/// let err = CalibrationError::divergence(
///     0.12,
///     200,
///     CoefficientSet::standard(),
///     DivergenceReason::MaxIterations,
/// );
/// assert!(format!("{}", err).contains("200"));
/// assert!(err.is_recoverable());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Calibration stopped before the error fell within tolerance.
    #[error(
        "Calibration did not converge after {iterations} iterations ({reason}): best error = {best_error:.6e}"
    )]
    Divergence {
        /// Lowest aggregate error reached
        best_error: f64,
        /// Sweeps performed
        iterations: usize,
        /// Coefficients at the lowest error
        coefficients: CoefficientSet,
        /// Stopping condition
        reason: DivergenceReason,
    },

    /// Cases or configuration cannot be used.
    #[error("Invalid calibration input: {message}")]
    InvalidInput {
        /// What is wrong
        message: String,
    },

    /// Valuation of a case failed.
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

impl CalibrationError {
    /// Create a divergence error.
    pub fn divergence(
        best_error: f64,
        iterations: usize,
        coefficients: CoefficientSet,
        reason: DivergenceReason,
    ) -> Self {
        CalibrationError::Divergence {
            best_error,
            iterations,
            coefficients,
            reason,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CalibrationError::InvalidInput {
            message: message.into(),
        }
    }

    /// Best coefficients reached before giving up, if any.
    pub fn best_coefficients(&self) -> Option<&CoefficientSet> {
        match self {
            CalibrationError::Divergence { coefficients, .. } => Some(coefficients),
            _ => None,
        }
    }

    /// Check if this is a recoverable error.
    ///
    /// A divergence might converge from another starting point or with a
    /// looser configuration; bad inputs will not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalibrationError::Divergence { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuer_core::params::ParameterKey;

    #[test]
    fn test_divergence_display() {
        let err = CalibrationError::divergence(
            0.5,
            7,
            CoefficientSet::standard(),
            DivergenceReason::StepExhausted,
        );
        let msg = format!("{}", err);
        assert!(msg.contains("7 iterations"));
        assert!(msg.contains("step size exhausted"));
        assert_eq!(err.best_coefficients(), Some(&CoefficientSet::standard()));
    }

    #[test]
    fn test_valuation_error_is_transparent() {
        let inner = ValuationError::missing(ParameterKey::new("market", "price_per_unit"));
        let err: CalibrationError = inner.clone().into();
        assert_eq!(format!("{}", err), format!("{}", inner));
        assert_eq!(err, CalibrationError::Valuation(inner));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_invalid_input() {
        let err = CalibrationError::invalid_input("no cases");
        assert!(format!("{}", err).contains("no cases"));
        assert!(err.best_coefficients().is_none());
    }
}
