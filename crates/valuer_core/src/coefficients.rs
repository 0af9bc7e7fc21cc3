//! Engine coefficients.
//!
//! Coefficients are the internal constants of the valuation formula. They are
//! distinct from user-facing parameters: callers do not set them per scenario,
//! calibration tunes them against reference data, and the result is then
//! passed explicitly to every engine call.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::params::{FlatValues, ParameterBounds, ParameterKey};
use crate::types::ValuationError;

/// Domain used when a coefficient is named in a flat map or an error.
pub const COEFFICIENT_DOMAIN: &str = "coefficient";

/// Tunable coefficient of the valuation formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coefficient {
    /// Fraction of revenue converted to free cash flow.
    CashConversion,
    /// Rate at which penetration approaches its long-run level.
    AdoptionSpeed,
    /// Fraction of a period by which cash flows are pulled forward for
    /// discounting (0 = end of period, 0.5 = mid-period).
    DiscountTiming,
}

impl Coefficient {
    /// All coefficients in declaration order.
    pub const ALL: [Coefficient; 3] = [
        Coefficient::CashConversion,
        Coefficient::AdoptionSpeed,
        Coefficient::DiscountTiming,
    ];

    /// Snake-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Coefficient::CashConversion => "cash_conversion",
            Coefficient::AdoptionSpeed => "adoption_speed",
            Coefficient::DiscountTiming => "discount_timing",
        }
    }

    /// Valid range.
    pub fn bounds(&self) -> ParameterBounds {
        match self {
            Coefficient::CashConversion => ParameterBounds::unit_interval(),
            Coefficient::AdoptionSpeed => ParameterBounds::new(0.01, 50.0),
            Coefficient::DiscountTiming => ParameterBounds::unit_interval(),
        }
    }

    /// Uncalibrated starting value.
    pub fn default_value(&self) -> f64 {
        match self {
            Coefficient::CashConversion => 0.25,
            Coefficient::AdoptionSpeed => 1.0,
            Coefficient::DiscountTiming => 0.0,
        }
    }

    /// Key used in flat maps and errors (`coefficient.<name>`).
    pub fn key(&self) -> ParameterKey {
        ParameterKey::new(COEFFICIENT_DOMAIN, self.name())
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Coefficient::CashConversion => 0,
            Coefficient::AdoptionSpeed => 1,
            Coefficient::DiscountTiming => 2,
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Coefficient {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coefficient::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ValuationError::UnknownParameter {
                key: ParameterKey::new(COEFFICIENT_DOMAIN, s),
            })
    }
}

/// Validated, immutable set of coefficient values.
///
/// # Examples
///
/// ```rust
/// use valuer_core::{Coefficient, CoefficientSet};
///
/// let coefficients = CoefficientSet::standard();
/// let tuned = coefficients.with_value(Coefficient::CashConversion, 0.3).unwrap();
///
/// assert_eq!(coefficients.get(Coefficient::CashConversion), 0.25);
/// assert_eq!(tuned.get(Coefficient::CashConversion), 0.3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSet {
    values: [f64; 3],
}

impl Default for CoefficientSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl CoefficientSet {
    /// Create a set from explicit values.
    pub fn new(
        cash_conversion: f64,
        adoption_speed: f64,
        discount_timing: f64,
    ) -> Result<Self, ValuationError> {
        let values = [cash_conversion, adoption_speed, discount_timing];
        for c in Coefficient::ALL {
            c.bounds().check(&c.key(), values[c.index()])?;
        }
        Ok(Self { values })
    }

    /// Uncalibrated defaults.
    pub fn standard() -> Self {
        let mut values = [0.0; 3];
        for c in Coefficient::ALL {
            values[c.index()] = c.default_value();
        }
        Self { values }
    }

    /// Value of `coefficient`.
    #[inline]
    pub fn get(&self, coefficient: Coefficient) -> f64 {
        self.values[coefficient.index()]
    }

    /// A new set with `coefficient` replaced.
    pub fn with_value(&self, coefficient: Coefficient, value: f64) -> Result<Self, ValuationError> {
        coefficient.bounds().check(&coefficient.key(), value)?;
        let mut values = self.values;
        values[coefficient.index()] = value;
        Ok(Self { values })
    }

    /// A new set with `coefficient` replaced by `value` clamped to its bounds.
    ///
    /// Non-finite values leave the coefficient unchanged.
    pub fn with_clamped(&self, coefficient: Coefficient, value: f64) -> Self {
        let mut values = self.values;
        if value.is_finite() {
            values[coefficient.index()] = coefficient.bounds().clamp(value);
        }
        Self { values }
    }

    /// `(coefficient, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Coefficient, f64)> + '_ {
        Coefficient::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Build from bare names (`cash_conversion = 0.3`).
    ///
    /// Every coefficient must be present.
    pub fn from_named(named: &BTreeMap<String, f64>) -> Result<Self, ValuationError> {
        for name in named.keys() {
            name.parse::<Coefficient>()?;
        }
        let mut values = [0.0; 3];
        for c in Coefficient::ALL {
            let value = *named
                .get(c.name())
                .ok_or_else(|| ValuationError::missing(c.key()))?;
            c.bounds().check(&c.key(), value)?;
            values[c.index()] = value;
        }
        Ok(Self { values })
    }

    /// Bare-name map.
    pub fn to_named(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(c, v)| (c.name().to_string(), v)).collect()
    }

    /// Flat `coefficient.<name> → value` form.
    pub fn to_flat(&self) -> FlatValues {
        self.iter().map(|(c, v)| (c.key().flat(), v)).collect()
    }

    /// Build from the flat form.
    pub fn from_flat(flat: &FlatValues) -> Result<Self, ValuationError> {
        let mut named = BTreeMap::new();
        for (flat_key, value) in flat {
            let key: ParameterKey = flat_key.parse()?;
            if key.domain() != COEFFICIENT_DOMAIN {
                return Err(ValuationError::UnknownParameter { key });
            }
            named.insert(key.name().to_string(), *value);
        }
        Self::from_named(&named)
    }
}

impl Serialize for CoefficientSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_named().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CoefficientSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let named = BTreeMap::<String, f64>::deserialize(deserializer)?;
        CoefficientSet::from_named(&named).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_within_bounds() {
        for c in Coefficient::ALL {
            assert!(c.bounds().contains(c.default_value()), "{}", c);
        }
        assert_eq!(CoefficientSet::default(), CoefficientSet::standard());
    }

    #[test]
    fn test_new_rejects_out_of_bounds() {
        let err = CoefficientSet::new(1.5, 1.0, 0.0).unwrap_err();
        assert_eq!(err.key(), Some(&Coefficient::CashConversion.key()));
    }

    #[test]
    fn test_with_clamped() {
        let set = CoefficientSet::standard().with_clamped(Coefficient::DiscountTiming, 3.0);
        assert_eq!(set.get(Coefficient::DiscountTiming), 1.0);
        let same = set.with_clamped(Coefficient::DiscountTiming, f64::NAN);
        assert_eq!(same, set);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "adoption_speed".parse::<Coefficient>().unwrap(),
            Coefficient::AdoptionSpeed
        );
        assert!("margin".parse::<Coefficient>().is_err());
    }

    #[test]
    fn test_from_named_requires_all() {
        let mut named = BTreeMap::new();
        named.insert("cash_conversion".to_string(), 0.3);
        let err = CoefficientSet::from_named(&named).unwrap_err();
        assert_eq!(
            err,
            ValuationError::missing(Coefficient::AdoptionSpeed.key())
        );
    }

    #[test]
    fn test_flat_round_trip() {
        let set = CoefficientSet::new(0.3, 2.0, 0.5).unwrap();
        let flat = set.to_flat();
        assert_eq!(flat.get("coefficient.adoption_speed"), Some(&2.0));
        assert_eq!(CoefficientSet::from_flat(&flat).unwrap(), set);
    }

    #[test]
    fn test_serde_json() {
        let set = CoefficientSet::new(0.3, 2.0, 0.5).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(
            json,
            r#"{"adoption_speed":2.0,"cash_conversion":0.3,"discount_timing":0.5}"#
        );
        let back: CoefficientSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
