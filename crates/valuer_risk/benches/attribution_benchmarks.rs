//! Benchmarks for valuer_risk.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use valuer_core::params::standard::*;
use valuer_core::params::{ParameterKey, ParameterSchema};
use valuer_core::{CoefficientSet, ParameterSet};
use valuer_models::ValuationEngine;
use valuer_risk::{AttributionEngine, AttributionMethod};

fn baseline() -> ParameterSet {
    ParameterSet::builder(ParameterSchema::standard())
        .set(FINANCIAL, DISCOUNT_RATE, 0.10)
        .set(FINANCIAL, TERMINAL_GROWTH, 0.03)
        .set(FINANCIAL, DILUTION_FACTOR, 1.0)
        .set(MARKET, MARKET_VOLUME, 2_500_000.0)
        .set(MARKET, PENETRATION_RATE, 0.08)
        .set(MARKET, PRICE_PER_UNIT, 45.0)
        .set(MARKET, VOLUME_GROWTH, 0.05)
        .set(MARKET, PRICE_GROWTH, 0.02)
        .build()
        .unwrap()
}

fn benchmark_attribution(c: &mut Criterion) {
    let coefficients = CoefficientSet::standard();
    let engine = ValuationEngine::default();
    let base = baseline();
    let mut variant = base.clone();
    for (key, value) in [
        (ParameterKey::new(FINANCIAL, DISCOUNT_RATE), 0.12),
        (ParameterKey::new(FINANCIAL, DILUTION_FACTOR), 0.85),
        (ParameterKey::new(MARKET, PENETRATION_RATE), 0.10),
        (ParameterKey::new(MARKET, PRICE_PER_UNIT), 50.0),
    ] {
        variant = variant.with_value(&key, value).unwrap();
    }
    let base_result = engine.compute(&base, &coefficients).unwrap();
    let variant_result = engine.compute(&variant, &coefficients).unwrap();

    let mut group = c.benchmark_group("attribution");
    for method in [AttributionMethod::OneAtATime, AttributionMethod::Sequential] {
        let attribution = AttributionEngine::new(engine).with_method(method);
        group.bench_function(method.name(), |b| {
            b.iter(|| {
                attribution.attribute(
                    black_box(&coefficients),
                    &base,
                    &base_result,
                    &variant,
                    &variant_result,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_attribution);
criterion_main!(benches);
