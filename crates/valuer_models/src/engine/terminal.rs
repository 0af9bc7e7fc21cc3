//! Perpetuity-growth terminal value.

use valuer_core::params::standard::*;
use valuer_core::params::ParameterKey;
use valuer_core::{ValuationError, ViolatedBound};

/// Fail unless `discount_rate > terminal_growth`.
pub(crate) fn ensure_convergent(
    discount_rate: f64,
    terminal_growth: f64,
) -> Result<(), ValuationError> {
    if discount_rate <= terminal_growth {
        return Err(ValuationError::invalid(
            ParameterKey::new(FINANCIAL, DISCOUNT_RATE),
            discount_rate,
            ViolatedBound::NotAbove {
                key: ParameterKey::new(FINANCIAL, TERMINAL_GROWTH),
                value: terminal_growth,
            },
        ));
    }
    Ok(())
}

/// Value at the end of the horizon of all cash flows beyond it.
///
/// The terminal-period cash flow is assumed to recur every period forever,
/// growing at `terminal_growth` and discounted at `discount_rate` (both
/// annual). With `q = ((1 + g) / (1 + r))^L` the geometric sum is
/// `CF · q / (1 − q)`, which reduces to the Gordon form `CF · (1 + g) / (r − g)`
/// for annual periods.
///
/// # Errors
///
/// `InvalidParameter` on `discount_rate` when it does not exceed
/// `terminal_growth`; the perpetuity would diverge.
pub(crate) fn perpetuity_value(
    terminal_cash_flow: f64,
    discount_rate: f64,
    terminal_growth: f64,
    period_length_years: f64,
) -> Result<f64, ValuationError> {
    ensure_convergent(discount_rate, terminal_growth)?;

    let q = ((1.0 + terminal_growth) / (1.0 + discount_rate)).powf(period_length_years);
    let value = terminal_cash_flow * q / (1.0 - q);
    if !value.is_finite() {
        return Err(ValuationError::non_finite("terminal value"));
    }
    Ok(value)
}
