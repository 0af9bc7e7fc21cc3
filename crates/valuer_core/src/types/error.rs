//! Error types for structured error handling.
//!
//! This module provides:
//! - `ValuationError`: Errors from parameter construction, valuation and attribution
//! - `ViolatedBound`: Description of the bound an invalid parameter broke

use std::fmt;
use thiserror::Error;

use crate::params::ParameterKey;

/// The bound an invalid parameter value violated.
///
/// # Examples
/// ```
/// use valuer_core::types::ViolatedBound;
///
/// let bound = ViolatedBound::Below { min: 0.0 };
/// assert_eq!(format!("{}", bound), "must be >= 0");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ViolatedBound {
    /// Value lies below the declared minimum.
    Below {
        /// Declared minimum (inclusive)
        min: f64,
    },
    /// Value lies above the declared maximum.
    Above {
        /// Declared maximum (inclusive)
        max: f64,
    },
    /// Value must strictly exceed another parameter but does not.
    NotAbove {
        /// The parameter that must be exceeded
        key: ParameterKey,
        /// Its current value
        value: f64,
    },
    /// Value is NaN or infinite.
    NotFinite,
}

impl fmt::Display for ViolatedBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolatedBound::Below { min } => write!(f, "must be >= {}", min),
            ViolatedBound::Above { max } => write!(f, "must be <= {}", max),
            ViolatedBound::NotAbove { key, value } => {
                write!(f, "must be > {} ({})", key, value)
            }
            ViolatedBound::NotFinite => write!(f, "must be finite"),
        }
    }
}

/// Categorised valuation errors.
///
/// Every variant is returned synchronously to the caller; a missing or
/// out-of-range parameter is never replaced by a default.
///
/// # Variants
/// - `MissingParameter`: A required parameter is absent from the set
/// - `InvalidParameter`: A value violates its declared range or a cross-parameter rule
/// - `UnknownParameter`: A key is not declared by the schema
/// - `ParameterSetMismatch`: Two sets (or a set and a result) are not comparable
/// - `InvalidConfig`: Engine configuration is unusable
/// - `NonFinite`: A computed quantity overflowed or became NaN
///
/// # Examples
/// ```
/// use valuer_core::params::ParameterKey;
/// use valuer_core::types::ValuationError;
///
/// let err = ValuationError::MissingParameter {
///     key: ParameterKey::new("financial", "discount_rate"),
/// };
/// assert_eq!(format!("{}", err), "Missing parameter: financial.discount_rate");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// A required parameter is absent.
    #[error("Missing parameter: {key}")]
    MissingParameter {
        /// The absent key
        key: ParameterKey,
    },

    /// A parameter value violates its declared bound.
    #[error("Invalid parameter {key} = {value}: {bound}")]
    InvalidParameter {
        /// The offending key
        key: ParameterKey,
        /// The rejected value
        value: f64,
        /// The violated bound
        bound: ViolatedBound,
    },

    /// A key that the schema does not declare.
    #[error("Unknown parameter: {key}")]
    UnknownParameter {
        /// The undeclared key
        key: ParameterKey,
    },

    /// Parameter sets with different key sets, or a result paired with
    /// the wrong parameter set.
    #[error("Parameter set mismatch: {reason}")]
    ParameterSetMismatch {
        /// What did not line up
        reason: String,
    },

    /// Unusable engine configuration.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// A computed quantity is NaN or infinite.
    #[error("Non-finite {quantity} in valuation")]
    NonFinite {
        /// Name of the quantity
        quantity: String,
    },
}

impl ValuationError {
    /// Create a missing parameter error.
    pub fn missing(key: ParameterKey) -> Self {
        ValuationError::MissingParameter { key }
    }

    /// Create an invalid parameter error.
    pub fn invalid(key: ParameterKey, value: f64, bound: ViolatedBound) -> Self {
        ValuationError::InvalidParameter { key, value, bound }
    }

    /// Create a parameter set mismatch error.
    pub fn mismatch(reason: impl Into<String>) -> Self {
        ValuationError::ParameterSetMismatch {
            reason: reason.into(),
        }
    }

    /// Create a non-finite quantity error.
    pub fn non_finite(quantity: impl Into<String>) -> Self {
        ValuationError::NonFinite {
            quantity: quantity.into(),
        }
    }

    /// Whether the error points at malformed input data rather than
    /// at a computation problem.
    ///
    /// Calibration treats these as fatal for the whole run.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ValuationError::MissingParameter { .. }
                | ValuationError::InvalidParameter { .. }
                | ValuationError::UnknownParameter { .. }
        )
    }

    /// The parameter key this error refers to, if any.
    pub fn key(&self) -> Option<&ParameterKey> {
        match self {
            ValuationError::MissingParameter { key }
            | ValuationError::InvalidParameter { key, .. }
            | ValuationError::UnknownParameter { key } => Some(key),
            _ => None,
        }
    }
}
