//! Coefficient calibration.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  Calibration                     │
//! ├──────────────────────────────────────────────────┤
//! │  CalibrationCase    - inputs + expected outputs  │
//! │  Objective          - RMS relative error         │
//! │  CoordinateDescent  - bounded search             │
//! │  CalibrationOutcome - coefficients + history     │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! The search only ever moves to strictly better coefficients, so the
//! recorded error history never increases. Cases may be valued on the rayon
//! pool (`parallel` feature), but errors are always folded in case order and
//! the outcome does not depend on how many threads ran.

mod case;
mod config;
mod error;
mod objective;
mod result;
mod search;

pub use case::{relative_error, CalibrationCase, ExpectedOutcome, ExpectedValuation};
pub use config::CalibrationConfig;
pub use error::{CalibrationError, DivergenceReason};
pub use objective::{CaseError, Evaluation, Objective};
pub use result::CalibrationOutcome;
pub use search::{calibrate, CoordinateDescentCalibrator};
