//! Valuation traits.
//!
//! [`Valuer`] is the seam between the valuation engine and its consumers:
//! the attribution engine and the calibration loop are generic over it.

use valuer_core::{CoefficientSet, ParameterSet, ValuationError};

use crate::result::ValuationResult;

/// Something that turns a parameter set into a valuation.
///
/// Implementations must be pure: identical inputs give bit-identical
/// results, and no state is kept between calls.
pub trait Valuer: Send + Sync {
    /// Value one scenario under the given coefficients.
    fn compute(
        &self,
        params: &ParameterSet,
        coefficients: &CoefficientSet,
    ) -> Result<ValuationResult, ValuationError>;

    /// Total valuation only.
    fn total_valuation(
        &self,
        params: &ParameterSet,
        coefficients: &CoefficientSet,
    ) -> Result<f64, ValuationError> {
        self.compute(params, coefficients)
            .map(|r| r.total_valuation())
    }
}

impl<V: Valuer + ?Sized> Valuer for &V {
    fn compute(
        &self,
        params: &ParameterSet,
        coefficients: &CoefficientSet,
    ) -> Result<ValuationResult, ValuationError> {
        (**self).compute(params, coefficients)
    }
}
