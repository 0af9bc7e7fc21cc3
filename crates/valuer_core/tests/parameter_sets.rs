//! Integration tests for parameter sets and coefficient sets.

use proptest::prelude::*;
use valuer_core::params::standard::*;
use valuer_core::params::{ParameterKey, ParameterSchema, ParameterSet};
use valuer_core::{CoefficientSet, ValuationError, ViolatedBound};

fn complete_set() -> ParameterSet {
    ParameterSet::builder(ParameterSchema::standard())
        .set(FINANCIAL, DISCOUNT_RATE, 0.10)
        .set(FINANCIAL, TERMINAL_GROWTH, 0.03)
        .set(FINANCIAL, DILUTION_FACTOR, 1.0)
        .set(MARKET, MARKET_VOLUME, 1_000_000.0)
        .set(MARKET, PENETRATION_RATE, 0.05)
        .set(MARKET, PRICE_PER_UNIT, 120.0)
        .set(MARKET, VOLUME_GROWTH, 0.04)
        .set(MARKET, PRICE_GROWTH, 0.02)
        .build()
        .unwrap()
}

#[test]
fn test_complete_set_has_every_declared_key() {
    let set = complete_set();
    assert!(set.is_complete());
    assert_eq!(set.len(), ParameterSchema::standard().len());
}

#[test]
fn test_error_names_the_violated_bound() {
    let err = ParameterSet::builder(ParameterSchema::standard())
        .set(MARKET, PENETRATION_RATE, -0.2)
        .build()
        .unwrap_err();

    match err {
        ValuationError::InvalidParameter { key, value, bound } => {
            assert_eq!(key, ParameterKey::new(MARKET, PENETRATION_RATE));
            assert_eq!(value, -0.2);
            assert_eq!(bound, ViolatedBound::Below { min: 0.0 });
        }
        other => panic!("expected InvalidParameter, got {:?}", other),
    }
}

#[test]
fn test_sets_from_separate_schema_instances_compare_equal() {
    let a = complete_set();
    let b = ParameterSet::from_flat(ParameterSchema::standard(), &a.to_flat()).unwrap();
    assert_eq!(a, b);
    assert!(a.same_keys(&b));
}

#[test]
fn test_coefficients_flat_keys() {
    let flat = CoefficientSet::standard().to_flat();
    let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "coefficient.adoption_speed",
            "coefficient.cash_conversion",
            "coefficient.discount_timing"
        ]
    );
}

proptest! {
    #[test]
    fn prop_in_range_dilution_always_builds(d in 0.0f64..=1.0) {
        let key = ParameterKey::new(FINANCIAL, DILUTION_FACTOR);
        let variant = complete_set().with_value(&key, d).unwrap();
        prop_assert_eq!(variant.get(&key), Some(d));
    }

    #[test]
    fn prop_out_of_range_dilution_rejected(d in 1.0f64..1e6) {
        prop_assume!(d > 1.0);
        let key = ParameterKey::new(FINANCIAL, DILUTION_FACTOR);
        let is_invalid = matches!(
            complete_set().with_value(&key, d),
            Err(ValuationError::InvalidParameter { .. })
        );
        prop_assert!(is_invalid);
    }

    #[test]
    fn prop_with_value_never_mutates_baseline(r in 0.0f64..=1.0) {
        let base = complete_set();
        let snapshot = base.clone();
        let _ = base.with_value(&ParameterKey::new(FINANCIAL, DISCOUNT_RATE), r);
        prop_assert_eq!(base, snapshot);
    }
}
