//! Immutable parameter sets.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::key::ParameterKey;
use super::schema::ParameterSchema;
use crate::types::ValuationError;

/// Nested `domain → parameter → value` document, the shape scenario files
/// and document stores use.
pub type ParameterDocument = BTreeMap<String, BTreeMap<String, f64>>;

/// Flat `domain.parameter → value` map for key-value stores.
pub type FlatValues = BTreeMap<String, f64>;

/// One parameter that differs between two sets.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDifference {
    /// Parameter key
    pub key: ParameterKey,
    /// Value in the first set
    pub before: f64,
    /// Value in the second set
    pub after: f64,
}

/// Immutable, validated bundle of scenario inputs.
///
/// Values are stored against a shared [`ParameterSchema`], so iteration is
/// always in declaration order. Every stored value has passed its bound check;
/// a set may still be partial, completeness is checked by consumers through
/// [`ParameterSet::require`].
///
/// # Examples
///
/// ```rust
/// use valuer_core::params::{ParameterKey, ParameterSchema, ParameterSet};
///
/// let base = ParameterSet::builder(ParameterSchema::standard())
///     .set("financial", "discount_rate", 0.10)
///     .set("financial", "terminal_growth", 0.03)
///     .build()
///     .unwrap();
///
/// let key = ParameterKey::new("financial", "discount_rate");
/// let bumped = base.with_value(&key, 0.12).unwrap();
///
/// assert_eq!(base.get(&key), Some(0.10));
/// assert_eq!(bumped.get(&key), Some(0.12));
/// ```
#[derive(Debug, Clone)]
pub struct ParameterSet {
    schema: Arc<ParameterSchema>,
    values: Vec<Option<f64>>,
}

impl PartialEq for ParameterSet {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema)
            && self.values == other.values
    }
}

impl ParameterSet {
    /// Start building a set against `schema`.
    pub fn builder(schema: Arc<ParameterSchema>) -> ParameterSetBuilder {
        ParameterSetBuilder {
            schema,
            entries: Vec::new(),
        }
    }

    /// Build from a nested document.
    ///
    /// # Errors
    ///
    /// `UnknownParameter` for undeclared keys, `InvalidParameter` for values
    /// outside their bounds.
    pub fn from_document(
        schema: Arc<ParameterSchema>,
        document: &ParameterDocument,
    ) -> Result<Self, ValuationError> {
        let mut builder = Self::builder(schema);
        for (domain, params) in document {
            for (name, value) in params {
                builder = builder.set(domain, name, *value);
            }
        }
        builder.build()
    }

    /// Build from a flat `domain.parameter` map.
    pub fn from_flat(
        schema: Arc<ParameterSchema>,
        flat: &FlatValues,
    ) -> Result<Self, ValuationError> {
        let mut builder = Self::builder(schema);
        for (flat_key, value) in flat {
            let key: ParameterKey = flat_key.parse()?;
            builder = builder.set_key(key, *value);
        }
        builder.build()
    }

    /// Schema the set was validated against.
    pub fn schema(&self) -> &Arc<ParameterSchema> {
        &self.schema
    }

    /// Value of `key`, if present.
    pub fn get(&self, key: &ParameterKey) -> Option<f64> {
        self.schema.position(key).and_then(|i| self.values[i])
    }

    /// Value of `domain.name`, if present.
    pub fn value(&self, domain: &str, name: &str) -> Option<f64> {
        self.get(&ParameterKey::new(domain, name))
    }

    /// Value of `key`, or `MissingParameter` naming it.
    pub fn require(&self, key: &ParameterKey) -> Result<f64, ValuationError> {
        self.get(key)
            .ok_or_else(|| ValuationError::missing(key.clone()))
    }

    /// Whether `key` carries a value.
    pub fn contains(&self, key: &ParameterKey) -> bool {
        self.get(key).is_some()
    }

    /// Present parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParameterKey, f64)> + '_ {
        self.schema
            .specs()
            .iter()
            .zip(&self.values)
            .filter_map(|(spec, v)| v.map(|v| (&spec.key, v)))
    }

    /// Present keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &ParameterKey> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Number of present parameters.
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Whether no parameter is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First declared key without a value.
    pub fn first_missing(&self) -> Option<&ParameterKey> {
        self.schema
            .specs()
            .iter()
            .zip(&self.values)
            .find(|(_, v)| v.is_none())
            .map(|(spec, _)| &spec.key)
    }

    /// Whether every declared parameter is present.
    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }

    /// A new set equal to this one except for `key`.
    ///
    /// The receiver is left untouched.
    pub fn with_value(&self, key: &ParameterKey, value: f64) -> Result<Self, ValuationError> {
        let position = self
            .schema
            .position(key)
            .ok_or_else(|| ValuationError::UnknownParameter { key: key.clone() })?;
        self.schema.specs()[position].bounds.check(key, value)?;

        let mut values = self.values.clone();
        values[position] = Some(value);
        Ok(Self {
            schema: Arc::clone(&self.schema),
            values,
        })
    }

    /// Whether both sets hold exactly the same keys.
    pub fn same_keys(&self, other: &Self) -> bool {
        self.keys().eq(other.keys())
    }

    /// Parameters whose values differ, in declaration order.
    ///
    /// # Errors
    ///
    /// `ParameterSetMismatch` when the key sets are not identical.
    pub fn differences(&self, other: &Self) -> Result<Vec<ParameterDifference>, ValuationError> {
        if !self.same_keys(other) {
            let ours: Vec<String> = self.keys().map(|k| k.flat()).collect();
            let theirs: Vec<String> = other.keys().map(|k| k.flat()).collect();
            return Err(ValuationError::mismatch(format!(
                "key sets differ: [{}] vs [{}]",
                ours.join(", "),
                theirs.join(", ")
            )));
        }

        Ok(self
            .iter()
            .zip(other.iter())
            .filter(|((_, a), (_, b))| a != b)
            .map(|((key, a), (_, b))| ParameterDifference {
                key: key.clone(),
                before: a,
                after: b,
            })
            .collect())
    }

    /// Flat `domain.parameter → value` form.
    pub fn to_flat(&self) -> FlatValues {
        self.iter().map(|(k, v)| (k.flat(), v)).collect()
    }

    /// Nested `domain → parameter → value` form.
    pub fn to_document(&self) -> ParameterDocument {
        let mut doc = ParameterDocument::new();
        for (key, value) in self.iter() {
            doc.entry(key.domain().to_string())
                .or_default()
                .insert(key.name().to_string(), value);
        }
        doc
    }
}

impl Serialize for ParameterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Builder for [`ParameterSet`].
///
/// Validation happens in [`ParameterSetBuilder::build`]; when a key is set
/// twice the later value is kept.
#[derive(Debug, Clone)]
pub struct ParameterSetBuilder {
    schema: Arc<ParameterSchema>,
    entries: Vec<(ParameterKey, f64)>,
}

impl ParameterSetBuilder {
    /// Set `domain.name` to `value`.
    pub fn set(self, domain: &str, name: &str, value: f64) -> Self {
        self.set_key(ParameterKey::new(domain, name), value)
    }

    /// Set `key` to `value`.
    pub fn set_key(mut self, key: ParameterKey, value: f64) -> Self {
        self.entries.push((key, value));
        self
    }

    /// Validate and build the set.
    ///
    /// Entries are checked in insertion order; the first failure is returned.
    pub fn build(self) -> Result<ParameterSet, ValuationError> {
        let mut values = vec![None; self.schema.len()];
        for (key, value) in self.entries {
            let position = self
                .schema
                .position(&key)
                .ok_or_else(|| ValuationError::UnknownParameter { key: key.clone() })?;
            self.schema.specs()[position].bounds.check(&key, value)?;
            values[position] = Some(value);
        }
        Ok(ParameterSet {
            schema: self.schema,
            values,
        })
    }
}
