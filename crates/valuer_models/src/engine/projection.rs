//! Explicit-horizon cash-flow projection.
//!
//! For period `t = 1..=N` with period length `L`, `τ = t·L` and
//! `e = (t−1)·L`:
//!
//! ```text
//! volume_t    = market_volume · (1 + volume_growth)^e · L
//! adoption_t  = 1 − exp(−adoption_speed · τ)
//! price_t     = price_per_unit · (1 + price_growth)^e
//! revenue_t   = volume_t · penetration_rate · adoption_t · price_t
//! cash_flow_t = revenue_t · cash_conversion · dilution_factor
//! df_t        = (1 + discount_rate)^−(τ − discount_timing·L)
//! ```

use std::sync::Arc;
use valuer_core::params::standard::*;
use valuer_core::params::{ParameterKey, ParameterSchema};
use valuer_core::{Coefficient, CoefficientSet, ParameterSet, ValuationError};

use super::config::EngineConfig;
use crate::result::PeriodCashFlow;

/// Parameters the engine reads, extracted and range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScenarioInputs {
    pub discount_rate: f64,
    pub terminal_growth: f64,
    pub dilution_factor: f64,
    pub market_volume: f64,
    pub penetration_rate: f64,
    pub price_per_unit: f64,
    pub volume_growth: f64,
    pub price_growth: f64,
}

impl ScenarioInputs {
    /// Read every required parameter in declaration order.
    ///
    /// Sets built against another schema are re-checked against the built-in
    /// bounds, so a looser custom schema cannot slip past the engine.
    pub fn from_params(params: &ParameterSet) -> Result<Self, ValuationError> {
        let reference = ParameterSchema::standard();
        let recheck = !Arc::ptr_eq(params.schema(), &reference);
        let read = |domain: &str, name: &str| -> Result<f64, ValuationError> {
            let key = ParameterKey::new(domain, name);
            let value = params.require(&key)?;
            if recheck {
                if let Some(spec) = reference.spec(&key) {
                    spec.bounds.check(&key, value)?;
                }
            }
            Ok(value)
        };

        Ok(Self {
            discount_rate: read(FINANCIAL, DISCOUNT_RATE)?,
            terminal_growth: read(FINANCIAL, TERMINAL_GROWTH)?,
            dilution_factor: read(FINANCIAL, DILUTION_FACTOR)?,
            market_volume: read(MARKET, MARKET_VOLUME)?,
            penetration_rate: read(MARKET, PENETRATION_RATE)?,
            price_per_unit: read(MARKET, PRICE_PER_UNIT)?,
            volume_growth: read(MARKET, VOLUME_GROWTH)?,
            price_growth: read(MARKET, PRICE_GROWTH)?,
        })
    }
}

/// Project every explicit period.
pub(crate) fn project(
    inputs: &ScenarioInputs,
    coefficients: &CoefficientSet,
    config: &EngineConfig,
) -> Result<Vec<PeriodCashFlow>, ValuationError> {
    let length = config.period_length_years;
    let cash_conversion = coefficients.get(Coefficient::CashConversion);
    let adoption_speed = coefficients.get(Coefficient::AdoptionSpeed);
    let timing = coefficients.get(Coefficient::DiscountTiming);

    let mut periods = Vec::with_capacity(config.horizon_periods);
    for t in 1..=config.horizon_periods {
        let time = t as f64 * length;
        let elapsed = time - length;

        let volume = inputs.market_volume * (1.0 + inputs.volume_growth).powf(elapsed) * length;
        let adoption = 1.0 - (-adoption_speed * time).exp();
        let price = inputs.price_per_unit * (1.0 + inputs.price_growth).powf(elapsed);
        let revenue = volume * inputs.penetration_rate * adoption * price;
        let cash_flow = revenue * cash_conversion * inputs.dilution_factor;

        let discount_factor = (1.0 + inputs.discount_rate).powf(-(time - timing * length));
        let discounted_cash_flow = cash_flow * discount_factor;

        if !discounted_cash_flow.is_finite() || !cash_flow.is_finite() {
            return Err(ValuationError::non_finite(format!("cash flow in period {}", t)));
        }

        periods.push(PeriodCashFlow {
            period: t,
            time,
            revenue,
            cash_flow,
            discount_factor,
            discounted_cash_flow,
        });
    }
    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs() -> ScenarioInputs {
        ScenarioInputs {
            discount_rate: 0.10,
            terminal_growth: 0.03,
            dilution_factor: 1.0,
            market_volume: 1000.0,
            penetration_rate: 0.5,
            price_per_unit: 10.0,
            volume_growth: 0.0,
            price_growth: 0.0,
        }
    }

    fn scenario(schema: Arc<ParameterSchema>, penetration: f64) -> ParameterSet {
        ParameterSet::builder(schema)
            .set(FINANCIAL, DISCOUNT_RATE, 0.10)
            .set(FINANCIAL, TERMINAL_GROWTH, 0.03)
            .set(FINANCIAL, DILUTION_FACTOR, 1.0)
            .set(MARKET, MARKET_VOLUME, 1000.0)
            .set(MARKET, PENETRATION_RATE, penetration)
            .set(MARKET, PRICE_PER_UNIT, 10.0)
            .set(MARKET, VOLUME_GROWTH, 0.0)
            .set(MARKET, PRICE_GROWTH, 0.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_from_params_standard_schema() {
        let read = ScenarioInputs::from_params(&scenario(ParameterSchema::standard(), 0.5));
        assert_eq!(read.unwrap(), inputs());
    }

    #[test]
    fn test_from_params_rechecks_looser_schema() {
        let mut specs = ParameterSchema::standard().specs().to_vec();
        for spec in &mut specs {
            if spec.key.name() == PENETRATION_RATE {
                spec.bounds = valuer_core::params::ParameterBounds::new(0.0, 5.0);
            }
        }
        let loose = Arc::new(ParameterSchema::new(specs).unwrap());

        assert!(ScenarioInputs::from_params(&scenario(loose.clone(), 0.5)).is_ok());
        let err = ScenarioInputs::from_params(&scenario(loose, 2.0)).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidParameter { .. }));
    }

    #[test]
    fn test_flat_market_with_instant_adoption() {
        // adoption_speed at its upper bound makes adoption ≈ 1 from period one.
        let coefficients = CoefficientSet::new(0.2, 50.0, 0.0).unwrap();
        let config = EngineConfig::new(3, 1.0).unwrap();
        let periods = project(&inputs(), &coefficients, &config).unwrap();

        assert_eq!(periods.len(), 3);
        for p in &periods {
            // 1000 · 0.5 · 10 · 0.2 = 1000
            assert_relative_eq!(p.cash_flow, 1000.0, max_relative = 1e-12);
        }
        assert_relative_eq!(periods[0].discount_factor, 1.0 / 1.1, max_relative = 1e-12);
        assert_relative_eq!(periods[2].discount_factor, 1.1_f64.powi(-3), max_relative = 1e-12);
    }

    #[test]
    fn test_growth_compounds_from_second_period() {
        let mut growing = inputs();
        growing.volume_growth = 0.10;
        growing.price_growth = 0.05;
        let coefficients = CoefficientSet::new(0.2, 50.0, 0.0).unwrap();
        let config = EngineConfig::new(2, 1.0).unwrap();
        let periods = project(&growing, &coefficients, &config).unwrap();

        assert_relative_eq!(periods[0].revenue, 5000.0, max_relative = 1e-12);
        assert_relative_eq!(periods[1].revenue, 5000.0 * 1.10 * 1.05, max_relative = 1e-12);
    }

    #[test]
    fn test_mid_period_timing_pulls_discounting_forward() {
        let end = CoefficientSet::new(0.2, 1.0, 0.0).unwrap();
        let mid = CoefficientSet::new(0.2, 1.0, 0.5).unwrap();
        let config = EngineConfig::new(1, 1.0).unwrap();

        let end_df = project(&inputs(), &end, &config).unwrap()[0].discount_factor;
        let mid_df = project(&inputs(), &mid, &config).unwrap()[0].discount_factor;
        assert_relative_eq!(mid_df, 1.1_f64.powf(-0.5), max_relative = 1e-12);
        assert!(mid_df > end_df);
    }

    #[test]
    fn test_dilution_scales_cash_flow_linearly() {
        let coefficients = CoefficientSet::standard();
        let config = EngineConfig::default();
        let full = project(&inputs(), &coefficients, &config).unwrap();
        let mut diluted_inputs = inputs();
        diluted_inputs.dilution_factor = 0.85;
        let diluted = project(&diluted_inputs, &coefficients, &config).unwrap();

        for (a, b) in full.iter().zip(&diluted) {
            assert_relative_eq!(b.cash_flow, a.cash_flow * 0.85, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_overflow_reported_as_non_finite() {
        let mut huge = inputs();
        huge.market_volume = 1e300;
        huge.price_per_unit = 1e300;
        let result = project(&huge, &CoefficientSet::standard(), &EngineConfig::default());
        assert!(matches!(result, Err(ValuationError::NonFinite { .. })));
    }
}
