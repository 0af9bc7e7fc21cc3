//! Valuation result types.

use serde::Serialize;
use valuer_core::params::FlatValues;
use valuer_core::ParameterSet;

/// Domain used for result entries in the flat key-value form.
pub const RESULT_DOMAIN: &str = "result";

/// One explicit projection period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodCashFlow {
    /// Period number, starting at 1
    pub period: usize,
    /// End of the period in years from valuation date
    pub time: f64,
    /// Projected revenue
    pub revenue: f64,
    /// Cash flow after conversion and dilution
    pub cash_flow: f64,
    /// Discount factor applied to the cash flow
    pub discount_factor: f64,
    /// `cash_flow · discount_factor`
    pub discounted_cash_flow: f64,
}

/// Output of one valuation.
///
/// Only the valuation engine builds these. The producing parameter set is
/// kept alongside the figures so attribution can check what it is comparing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    periods: Vec<PeriodCashFlow>,
    present_value: f64,
    terminal_value: f64,
    discounted_terminal_value: f64,
    total_valuation: f64,
    parameters: ParameterSet,
}

impl ValuationResult {
    pub(crate) fn new(
        periods: Vec<PeriodCashFlow>,
        terminal_value: f64,
        discounted_terminal_value: f64,
        parameters: ParameterSet,
    ) -> Self {
        let present_value = periods.iter().map(|p| p.discounted_cash_flow).sum::<f64>();
        Self {
            total_valuation: present_value + discounted_terminal_value,
            periods,
            present_value,
            terminal_value,
            discounted_terminal_value,
            parameters,
        }
    }

    /// Projection periods in order.
    pub fn periods(&self) -> &[PeriodCashFlow] {
        &self.periods
    }

    /// Per-period cash flows in order.
    pub fn cash_flows(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.cash_flow).collect()
    }

    /// Number of explicit periods.
    pub fn horizon(&self) -> usize {
        self.periods.len()
    }

    /// Sum of discounted explicit-period cash flows.
    pub fn present_value(&self) -> f64 {
        self.present_value
    }

    /// Terminal value at the end of the horizon, undiscounted.
    pub fn terminal_value(&self) -> f64 {
        self.terminal_value
    }

    /// Terminal value discounted to the valuation date.
    pub fn discounted_terminal_value(&self) -> f64 {
        self.discounted_terminal_value
    }

    /// Present value plus discounted terminal value.
    pub fn total_valuation(&self) -> f64 {
        self.total_valuation
    }

    /// Share of the total that comes from the terminal value.
    pub fn terminal_share(&self) -> f64 {
        if self.total_valuation == 0.0 {
            0.0
        } else {
            self.discounted_terminal_value / self.total_valuation
        }
    }

    /// Parameter set that produced this result.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Flat `result.<figure> → value` form.
    ///
    /// Cash flows are keyed `result.cash_flow.<period>`.
    pub fn to_flat(&self) -> FlatValues {
        let mut flat = FlatValues::new();
        flat.insert(format!("{}.present_value", RESULT_DOMAIN), self.present_value);
        flat.insert(format!("{}.terminal_value", RESULT_DOMAIN), self.terminal_value);
        flat.insert(
            format!("{}.discounted_terminal_value", RESULT_DOMAIN),
            self.discounted_terminal_value,
        );
        flat.insert(format!("{}.total_valuation", RESULT_DOMAIN), self.total_valuation);
        for p in &self.periods {
            flat.insert(format!("{}.cash_flow.{}", RESULT_DOMAIN, p.period), p.cash_flow);
        }
        flat
    }

    /// Whether two results carry bit-identical figures.
    pub fn bit_identical(&self, other: &Self) -> bool {
        fn bits(r: &ValuationResult) -> Vec<u64> {
            let mut out = vec![
                r.present_value.to_bits(),
                r.terminal_value.to_bits(),
                r.discounted_terminal_value.to_bits(),
                r.total_valuation.to_bits(),
            ];
            for p in &r.periods {
                out.extend([
                    p.time.to_bits(),
                    p.revenue.to_bits(),
                    p.cash_flow.to_bits(),
                    p.discount_factor.to_bits(),
                    p.discounted_cash_flow.to_bits(),
                ]);
            }
            out
        }
        bits(self) == bits(other)
    }
}
