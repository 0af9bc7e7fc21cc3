//! # valuer_models: Scenario Valuation Engine
//!
//! ## Layer 2 (Models) Role
//!
//! Turns a validated [`ParameterSet`](valuer_core::ParameterSet) and a
//! [`CoefficientSet`](valuer_core::CoefficientSet) into a [`ValuationResult`]:
//! per-period cash flows over an explicit horizon, their present value, a
//! perpetuity-growth terminal value, and the total valuation.
//!
//! The engine is a pure function. It keeps no state between calls, performs
//! no I/O, and takes its coefficients as an explicit argument.
//!
//! ## Modules
//!
//! - `engine`: [`EngineConfig`], [`ValuationEngine`]
//! - `result`: [`ValuationResult`], [`PeriodCashFlow`]
//! - `traits`: [`Valuer`]

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod engine;
pub mod result;
pub mod traits;

pub use engine::{EngineConfig, ValuationEngine};
pub use result::{PeriodCashFlow, ValuationResult};
pub use traits::Valuer;
