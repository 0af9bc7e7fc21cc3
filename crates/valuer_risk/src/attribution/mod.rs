//! Valuation-delta attribution.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │             Attribution Engine               │
//! ├──────────────────────────────────────────────┤
//! │  AttributionMethod - probe strategy          │
//! │  AttributionEngine - probe & collect         │
//! │  AttributionReport - entries + residual      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! For every parameter that differs between baseline and variant a probe
//! scenario is valued. The probe's total minus the baseline total is that
//! parameter's contribution; what the contributions leave unexplained is the
//! residual, which is always reported.

mod engine;
mod method;
mod report;

pub use engine::AttributionEngine;
pub use method::AttributionMethod;
pub use report::{AttributionEntry, AttributionReport};
