//! Parameter keys.
//!
//! A [`ParameterKey`] names one parameter inside one domain. Its flat form is
//! `domain.parameter`, used at the persistence boundary and in error messages.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::types::ValuationError;

/// Identifier of a single parameter: `(domain, name)`.
///
/// # Examples
///
/// ```rust
/// use valuer_core::params::ParameterKey;
///
/// let key = ParameterKey::new("financial", "discount_rate");
/// assert_eq!(key.to_string(), "financial.discount_rate");
///
/// let parsed: ParameterKey = "market.penetration_rate".parse().unwrap();
/// assert_eq!(parsed.domain(), "market");
/// assert_eq!(parsed.name(), "penetration_rate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterKey {
    domain: String,
    name: String,
}

impl ParameterKey {
    /// Create a key from its domain and parameter name.
    #[inline]
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }

    /// Domain the parameter belongs to.
    #[inline]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Parameter name within its domain.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flat `domain.parameter` form.
    pub fn flat(&self) -> String {
        format!("{}.{}", self.domain, self.name)
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.name)
    }
}

impl FromStr for ParameterKey {
    type Err = ValuationError;

    /// Parse `domain.parameter`. The domain is everything before the first dot.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((domain, name)) if !domain.is_empty() && !name.is_empty() => {
                Ok(ParameterKey::new(domain, name))
            }
            _ => Err(ValuationError::UnknownParameter {
                key: ParameterKey::new("", s),
            }),
        }
    }
}

impl Serialize for ParameterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParameterKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
