//! Parameter schemas.
//!
//! A [`ParameterSchema`] declares, in order, every parameter a scenario may
//! carry together with its valid range. Declaration order is the canonical
//! order used wherever parameters are listed (iteration, attribution reports,
//! first-missing-key detection).

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use super::key::ParameterKey;
use crate::types::{ValuationError, ViolatedBound};

/// Names of the built-in valuation domains and parameters.
pub mod standard {
    /// Financial assumptions domain.
    pub const FINANCIAL: &str = "financial";
    /// Market and demand assumptions domain.
    pub const MARKET: &str = "market";

    /// Annual discount rate.
    pub const DISCOUNT_RATE: &str = "discount_rate";
    /// Perpetual growth rate beyond the horizon.
    pub const TERMINAL_GROWTH: &str = "terminal_growth";
    /// Share of cash flows retained after dilution.
    pub const DILUTION_FACTOR: &str = "dilution_factor";

    /// Addressable units per year at the start of the horizon.
    pub const MARKET_VOLUME: &str = "market_volume";
    /// Long-run share of the addressable market captured.
    pub const PENETRATION_RATE: &str = "penetration_rate";
    /// Price per unit at the start of the horizon.
    pub const PRICE_PER_UNIT: &str = "price_per_unit";
    /// Annual growth of market volume.
    pub const VOLUME_GROWTH: &str = "volume_growth";
    /// Annual growth of the unit price.
    pub const PRICE_GROWTH: &str = "price_growth";
}

/// Bounds for a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterBounds {
    /// Minimum allowed value.
    pub min: f64,
    /// Maximum allowed value.
    pub max: f64,
}

impl ParameterBounds {
    /// Create new bounds.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Create bounds for a non-negative parameter.
    pub fn non_negative() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }

    /// Create bounds for a parameter in [0, 1].
    pub fn unit_interval() -> Self {
        Self { min: 0.0, max: 1.0 }
    }

    /// Check if a value is within bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a value to bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Width of the interval, `None` when either side is unbounded.
    pub fn width(&self) -> Option<f64> {
        let w = self.max - self.min;
        w.is_finite().then_some(w)
    }

    /// Validate `value` for `key`, naming the violated side on failure.
    pub fn check(&self, key: &ParameterKey, value: f64) -> Result<(), ValuationError> {
        if !value.is_finite() {
            return Err(ValuationError::invalid(
                key.clone(),
                value,
                ViolatedBound::NotFinite,
            ));
        }
        if value < self.min {
            return Err(ValuationError::invalid(
                key.clone(),
                value,
                ViolatedBound::Below { min: self.min },
            ));
        }
        if value > self.max {
            return Err(ValuationError::invalid(
                key.clone(),
                value,
                ViolatedBound::Above { max: self.max },
            ));
        }
        Ok(())
    }
}

/// Declaration of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    /// Parameter key
    pub key: ParameterKey,
    /// Valid range (inclusive)
    pub bounds: ParameterBounds,
    /// Short human-readable description
    pub description: String,
}

impl ParameterSpec {
    /// Create a parameter declaration.
    pub fn new(
        domain: &str,
        name: &str,
        bounds: ParameterBounds,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: ParameterKey::new(domain, name),
            bounds,
            description: description.into(),
        }
    }
}

/// Ordered collection of parameter declarations.
///
/// # Examples
///
/// ```rust
/// use valuer_core::params::{ParameterKey, ParameterSchema};
///
/// let schema = ParameterSchema::standard();
/// let key = ParameterKey::new("financial", "discount_rate");
/// assert_eq!(schema.position(&key), Some(0));
/// assert_eq!(schema.domains(), vec!["financial", "market"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    specs: Vec<ParameterSpec>,
    index: BTreeMap<ParameterKey, usize>,
}

impl ParameterSchema {
    /// Build a schema from declarations in order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for duplicate keys or inverted bounds.
    pub fn new(specs: Vec<ParameterSpec>) -> Result<Self, ValuationError> {
        let mut index = BTreeMap::new();
        for (i, spec) in specs.iter().enumerate() {
            if spec.bounds.min.is_nan() || spec.bounds.max.is_nan() || spec.bounds.min > spec.bounds.max {
                return Err(ValuationError::InvalidConfig(format!(
                    "bounds for {} are inverted: [{}, {}]",
                    spec.key, spec.bounds.min, spec.bounds.max
                )));
            }
            if index.insert(spec.key.clone(), i).is_some() {
                return Err(ValuationError::InvalidConfig(format!(
                    "parameter {} declared twice",
                    spec.key
                )));
            }
        }
        Ok(Self { specs, index })
    }

    /// The built-in valuation schema.
    ///
    /// Built once per process; every call returns the same shared instance.
    pub fn standard() -> Arc<Self> {
        static STANDARD: OnceLock<Arc<ParameterSchema>> = OnceLock::new();
        Arc::clone(STANDARD.get_or_init(Self::build_standard))
    }

    fn build_standard() -> Arc<Self> {
        use standard::*;

        let specs = vec![
            ParameterSpec::new(
                FINANCIAL,
                DISCOUNT_RATE,
                ParameterBounds::unit_interval(),
                "Annual discount rate",
            ),
            ParameterSpec::new(
                FINANCIAL,
                TERMINAL_GROWTH,
                ParameterBounds::new(-0.5, 0.5),
                "Perpetual growth beyond the horizon",
            ),
            ParameterSpec::new(
                FINANCIAL,
                DILUTION_FACTOR,
                ParameterBounds::unit_interval(),
                "Share of cash flows retained after dilution",
            ),
            ParameterSpec::new(
                MARKET,
                MARKET_VOLUME,
                ParameterBounds::non_negative(),
                "Addressable units per year",
            ),
            ParameterSpec::new(
                MARKET,
                PENETRATION_RATE,
                ParameterBounds::unit_interval(),
                "Long-run market share",
            ),
            ParameterSpec::new(
                MARKET,
                PRICE_PER_UNIT,
                ParameterBounds::non_negative(),
                "Unit price at the start of the horizon",
            ),
            ParameterSpec::new(
                MARKET,
                VOLUME_GROWTH,
                ParameterBounds::new(-1.0, 10.0),
                "Annual market volume growth",
            ),
            ParameterSpec::new(
                MARKET,
                PRICE_GROWTH,
                ParameterBounds::new(-1.0, 10.0),
                "Annual unit price growth",
            ),
        ];

        // Built-in declarations are unique and ordered.
        match Self::new(specs) {
            Ok(schema) => Arc::new(schema),
            Err(e) => unreachable!("standard schema is well-formed: {}", e),
        }
    }

    /// Declarations in order.
    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &ParameterKey> {
        self.specs.iter().map(|s| &s.key)
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the schema declares nothing.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Declaration position of `key`.
    pub fn position(&self, key: &ParameterKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Declaration of `key`.
    pub fn spec(&self, key: &ParameterKey) -> Option<&ParameterSpec> {
        self.position(key).map(|i| &self.specs[i])
    }

    /// Domain names in order of first declaration.
    pub fn domains(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for spec in &self.specs {
            if !out.contains(&spec.key.domain()) {
                out.push(spec.key.domain());
            }
        }
        out
    }
}
