//! # valuer_core: Foundation for Scenario Valuation
//!
//! ## Layer 1 (Foundation) Role
//!
//! valuer_core serves as the bottom layer of the workspace, providing:
//! - Parameter schemas and immutable parameter sets (`params`)
//! - Engine coefficients (`coefficients`)
//! - Error types: `ValuationError`, `ViolatedBound` (`types`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other valuer_* crates, with minimal external dependencies:
//! - thiserror: Error derivation
//! - serde: Serialisation at the persistence boundary
//!
//! ## Usage Examples
//!
//! ```rust
//! use valuer_core::params::{ParameterKey, ParameterSchema, ParameterSet};
//! use valuer_core::CoefficientSet;
//!
//! let params = ParameterSet::builder(ParameterSchema::standard())
//!     .set("financial", "discount_rate", 0.10)
//!     .set("financial", "terminal_growth", 0.03)
//!     .build()
//!     .unwrap();
//!
//! let flat = params.to_flat();
//! assert_eq!(flat["financial.discount_rate"], 0.10);
//!
//! let coefficients = CoefficientSet::standard();
//! assert_eq!(coefficients.to_flat().len(), 3);
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod coefficients;
pub mod params;
pub mod types;

pub use coefficients::{Coefficient, CoefficientSet};
pub use params::{ParameterKey, ParameterSchema, ParameterSet};
pub use types::{ValuationError, ViolatedBound};
