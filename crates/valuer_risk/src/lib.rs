//! # valuer_risk: Scenario Attribution
//!
//! Compares two valued scenarios and explains the difference between their
//! totals parameter by parameter.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            valuer_risk (L4)             │
//! ├─────────────────────────────────────────┤
//! │  attribution/ - AttributionEngine,      │
//! │                 AttributionReport       │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │           valuer_models (L2)            │
//! │  ValuationEngine behind `Valuer`        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use valuer_core::params::{ParameterKey, ParameterSchema};
//! use valuer_core::{CoefficientSet, ParameterSet};
//! use valuer_models::ValuationEngine;
//! use valuer_risk::AttributionEngine;
//!
//! let baseline = ParameterSet::builder(ParameterSchema::standard())
//!     .set("financial", "discount_rate", 0.10)
//!     .set("financial", "terminal_growth", 0.03)
//!     .set("financial", "dilution_factor", 1.0)
//!     .set("market", "market_volume", 1_000_000.0)
//!     .set("market", "penetration_rate", 0.05)
//!     .set("market", "price_per_unit", 120.0)
//!     .set("market", "volume_growth", 0.04)
//!     .set("market", "price_growth", 0.02)
//!     .build()
//!     .unwrap();
//! let variant = baseline
//!     .with_value(&ParameterKey::new("financial", "dilution_factor"), 0.85)
//!     .unwrap();
//!
//! let engine = ValuationEngine::default();
//! let coefficients = CoefficientSet::standard();
//! let base_result = engine.compute(&baseline, &coefficients).unwrap();
//! let variant_result = engine.compute(&variant, &coefficients).unwrap();
//!
//! let report = AttributionEngine::new(engine)
//!     .attribute(&coefficients, &baseline, &base_result, &variant, &variant_result)
//!     .unwrap();
//!
//! assert_eq!(report.entries().len(), 1);
//! assert_eq!(report.residual(), 0.0);
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod attribution;

pub use attribution::{AttributionEngine, AttributionEntry, AttributionMethod, AttributionReport};
