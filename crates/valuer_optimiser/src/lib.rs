//! # valuer_optimiser: Coefficient Calibration
//!
//! ## Layer 2.5 (Optimiser) Role
//!
//! Tunes the engine's [`CoefficientSet`](valuer_core::CoefficientSet) until
//! computed valuations reproduce a trusted reference table within tolerance.
//!
//! - `calibration`: cases, objective, coordinate-descent search
//! - `reference`: TOML and CSV reference table loaders
//!
//! ## Feature Flags
//!
//! - `parallel` (default): evaluate calibration cases with rayon

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;
pub mod reference;

pub use calibration::{
    calibrate, CalibrationCase, CalibrationConfig, CalibrationError, CalibrationOutcome,
    CaseError, CoordinateDescentCalibrator, DivergenceReason, ExpectedOutcome, ExpectedValuation,
};
pub use reference::{load_cases, ReferenceError};
