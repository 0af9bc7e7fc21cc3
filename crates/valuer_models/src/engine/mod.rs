//! Valuation engine.
//!
//! ## Available Components
//!
//! - [`EngineConfig`]: explicit projection horizon
//! - [`ValuationEngine`]: parameter set + coefficients → [`ValuationResult`](crate::ValuationResult)
//!
//! ## Pipeline
//!
//! ```text
//! ParameterSet ──► ScenarioInputs ──► project() ──► Σ discounted CF ─┐
//!                       │                                            ├─► total
//!                       └──────► perpetuity_value() ──► discount ───┘
//! ```

mod config;
mod projection;
mod terminal;
mod valuation;

pub use config::EngineConfig;
pub use valuation::ValuationEngine;
