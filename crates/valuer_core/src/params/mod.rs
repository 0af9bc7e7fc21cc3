//! Scenario parameters.
//!
//! This module provides:
//! - [`ParameterKey`]: `(domain, name)` identifier with a flat `domain.name` form
//! - [`ParameterSchema`]: ordered declarations with valid ranges
//! - [`ParameterSet`]: immutable validated values for one scenario
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              ParameterSchema                  │
//! │  financial.discount_rate     [0, 1]           │
//! │  financial.terminal_growth   [-0.5, 0.5]      │
//! │  ...                                          │
//! └──────────────────────────────────────────────┘
//!          ↑ Arc (shared, read-only)
//! ┌──────────────────────────────────────────────┐
//! │  ParameterSet  (baseline)  ParameterSet (variant)
//! │  with_value() → new set, original untouched   │
//! └──────────────────────────────────────────────┘
//! ```

mod key;
mod schema;
mod set;

pub use key::ParameterKey;
pub use schema::{standard, ParameterBounds, ParameterSchema, ParameterSpec};
pub use set::{
    FlatValues, ParameterDifference, ParameterDocument, ParameterSet, ParameterSetBuilder,
};
