//! Attribution properties: additivity, identity, ordering, and stable output.

use approx::assert_relative_eq;
use proptest::prelude::*;
use valuer_core::params::standard::*;
use valuer_core::params::{ParameterKey, ParameterSchema};
use valuer_core::{CoefficientSet, ParameterSet};
use valuer_models::{ValuationEngine, ValuationResult};
use valuer_risk::{AttributionEngine, AttributionMethod, AttributionReport};

#[allow(clippy::too_many_arguments)]
fn scenario(
    discount_rate: f64,
    terminal_growth: f64,
    dilution: f64,
    volume: f64,
    penetration: f64,
    price: f64,
    volume_growth: f64,
    price_growth: f64,
) -> ParameterSet {
    ParameterSet::builder(ParameterSchema::standard())
        .set(FINANCIAL, DISCOUNT_RATE, discount_rate)
        .set(FINANCIAL, TERMINAL_GROWTH, terminal_growth)
        .set(FINANCIAL, DILUTION_FACTOR, dilution)
        .set(MARKET, MARKET_VOLUME, volume)
        .set(MARKET, PENETRATION_RATE, penetration)
        .set(MARKET, PRICE_PER_UNIT, price)
        .set(MARKET, VOLUME_GROWTH, volume_growth)
        .set(MARKET, PRICE_GROWTH, price_growth)
        .build()
        .unwrap()
}

fn reference_baseline() -> ParameterSet {
    scenario(0.10, 0.03, 1.0, 2_500_000.0, 0.08, 45.0, 0.05, 0.02)
}

fn valued(params: &ParameterSet) -> ValuationResult {
    ValuationEngine::default()
        .compute(params, &CoefficientSet::standard())
        .unwrap()
}

fn attribute(
    method: AttributionMethod,
    baseline: &ParameterSet,
    variant: &ParameterSet,
) -> AttributionReport {
    AttributionEngine::new(ValuationEngine::default())
        .with_method(method)
        .attribute(
            &CoefficientSet::standard(),
            baseline,
            &valued(baseline),
            variant,
            &valued(variant),
        )
        .unwrap()
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_dilution_only_change_carries_whole_delta() {
    let baseline = reference_baseline();
    let variant = baseline
        .with_value(&ParameterKey::new(FINANCIAL, DILUTION_FACTOR), 0.85)
        .unwrap();
    let report = attribute(AttributionMethod::OneAtATime, &baseline, &variant);

    assert_eq!(report.entries().len(), 1);
    let entry = &report.entries()[0];
    assert_eq!(entry.key, ParameterKey::new(FINANCIAL, DILUTION_FACTOR));
    assert_eq!(entry.baseline_value, 1.0);
    assert_eq!(entry.variant_value, 0.85);
    assert_relative_eq!(entry.contribution, report.total_delta(), max_relative = 1e-12);
    assert_relative_eq!(report.residual(), 0.0, epsilon = 1e-6);
    assert_relative_eq!(
        report.total_delta(),
        -0.15 * report.baseline_total(),
        max_relative = 1e-9
    );
}

#[test]
fn test_entries_follow_declaration_order() {
    let baseline = reference_baseline();
    let variant = scenario(0.12, 0.03, 0.9, 2_500_000.0, 0.1, 45.0, 0.07, 0.02);
    let report = attribute(AttributionMethod::OneAtATime, &baseline, &variant);

    let keys: Vec<String> = report.entries().iter().map(|e| e.key.flat()).collect();
    assert_eq!(
        keys,
        vec![
            "financial.discount_rate",
            "financial.dilution_factor",
            "market.penetration_rate",
            "market.volume_growth",
        ]
    );
}

#[test]
fn test_serialised_report_is_byte_identical() {
    let baseline = reference_baseline();
    let variant = scenario(0.11, 0.02, 0.95, 3_000_000.0, 0.07, 50.0, 0.04, 0.03);

    let first = serde_json::to_string(&attribute(
        AttributionMethod::OneAtATime,
        &baseline,
        &variant,
    ))
    .unwrap();
    let second = serde_json::to_string(&attribute(
        AttributionMethod::OneAtATime,
        &baseline,
        &variant,
    ))
    .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_methods_agree_on_single_change() {
    let baseline = reference_baseline();
    let variant = baseline
        .with_value(&ParameterKey::new(MARKET, PRICE_GROWTH), 0.04)
        .unwrap();
    let oaat = attribute(AttributionMethod::OneAtATime, &baseline, &variant);
    let waterfall = attribute(AttributionMethod::Sequential, &baseline, &variant);
    assert_eq!(
        oaat.entries()[0].contribution.to_bits(),
        waterfall.entries()[0].contribution.to_bits()
    );
}

fn scenario_strategy() -> impl Strategy<Value = ParameterSet> {
    (
        0.08f64..=0.20,
        0.0f64..=0.05,
        0.5f64..=1.0,
        1_000.0f64..=5_000_000.0,
        0.01f64..=0.5,
        1.0f64..=200.0,
        -0.1f64..=0.2,
        -0.05f64..=0.1,
    )
        .prop_map(|(r, g, d, v, p, price, vg, pg)| scenario(r, g, d, v, p, price, vg, pg))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_contributions_plus_residual_equal_delta(
        baseline in scenario_strategy(),
        variant in scenario_strategy(),
    ) {
        for method in [AttributionMethod::OneAtATime, AttributionMethod::Sequential] {
            let report = attribute(method, &baseline, &variant);
            prop_assert!(report.is_additive(1e-6));
            let explained: f64 = report.entries().iter().map(|e| e.contribution).sum();
            let scale = report.baseline_total().abs().max(report.variant_total().abs());
            prop_assert!(
                (explained + report.residual() - report.total_delta()).abs() <= 1e-6 * scale
            );
        }
    }

    #[test]
    fn prop_sequential_residual_is_rounding_only(
        baseline in scenario_strategy(),
        variant in scenario_strategy(),
    ) {
        let report = attribute(AttributionMethod::Sequential, &baseline, &variant);
        let scale = report.baseline_total().abs().max(report.variant_total().abs());
        prop_assert!(report.residual().abs() <= 1e-9 * scale);
    }

    #[test]
    fn prop_self_attribution_is_empty(baseline in scenario_strategy()) {
        let report = attribute(AttributionMethod::OneAtATime, &baseline, &baseline);
        prop_assert!(report.is_empty());
        prop_assert_eq!(report.residual(), 0.0);
    }
}
