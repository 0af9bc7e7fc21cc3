//! CLI error types

use thiserror::Error;
use valuer_core::ValuationError;
use valuer_optimiser::{CalibrationError, ReferenceError};

use crate::config::ConfigError;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Bad command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Input file could not be parsed
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File being read
        path: String,
        /// Parser message
        message: String,
    },

    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Valuation or attribution failure
    #[error(transparent)]
    Valuation(#[from] ValuationError),

    /// Calibration failure
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Reference table failure
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// Output encoding failure
    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;
