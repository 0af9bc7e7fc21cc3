//! Core error types.
//!
//! # Re-exports
//!
//! [`ValuationError`] and [`ViolatedBound`] from `error`.

pub mod error;

pub use error::{ValuationError, ViolatedBound};
