//! Valuer CLI - Command Line Operations for Scenario Valuation
//!
//! This is the operational entry point for the valuation engines.
//!
//! # Commands
//!
//! - `valuer compute <scenario>` - Value one scenario
//! - `valuer attribute <baseline> <variant>` - Explain a valuation change
//! - `valuer calibrate <reference>` - Fit engine coefficients to a reference table
//! - `valuer schema` - List parameters and coefficients
//!
//! # Configuration
//!
//! Settings come from `valuer.toml` (or `--config`), then `VALUER_*`
//! environment variables, then flags. `RUST_LOG` overrides the log level.
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate does the file I/O and wires
//! the pure engines of the lower layers together.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use valuer_core::Coefficient;

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use config::{build_config, CliArgs};

/// Scenario valuation, attribution and calibration
#[derive(Parser)]
#[command(name = "valuer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Number of explicit projection periods
    #[arg(long, global = true)]
    horizon_periods: Option<usize>,

    /// Length of one projection period in years
    #[arg(long, global = true)]
    period_length_years: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value one scenario
    Compute {
        /// Scenario file (TOML/JSON)
        scenario: PathBuf,

        /// Coefficient file; uncalibrated defaults when omitted
        #[arg(long)]
        coefficients: Option<PathBuf>,
    },

    /// Attribute the change between two scenarios to their parameters
    Attribute {
        /// Baseline scenario file
        baseline: PathBuf,

        /// Variant scenario file
        variant: PathBuf,

        /// Coefficient file; uncalibrated defaults when omitted
        #[arg(long)]
        coefficients: Option<PathBuf>,

        /// Attribution method (one_at_a_time, sequential)
        #[arg(short, long, default_value = "one_at_a_time")]
        method: String,
    },

    /// Calibrate engine coefficients against a reference table
    Calibrate {
        /// Reference table (TOML/CSV)
        reference: PathBuf,

        /// Starting coefficients; uncalibrated defaults when omitted
        #[arg(long)]
        initial: Option<PathBuf>,

        /// Output file for calibrated coefficients
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Aggregate error tolerance
        #[arg(long)]
        tolerance: Option<f64>,

        /// Maximum number of sweeps
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Coefficients to fit, comma separated
        #[arg(long, value_delimiter = ',')]
        free: Option<Vec<Coefficient>>,

        /// Evaluate cases on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// List scenario parameters and engine coefficients
    Schema,
}

impl Cli {
    fn config_args(&self) -> CliArgs {
        let mut args = CliArgs {
            config_file: self.config.clone(),
            log_level: self.log_level.clone(),
            format: self.format.clone(),
            horizon_periods: self.horizon_periods,
            period_length_years: self.period_length_years,
            ..Default::default()
        };
        if let Commands::Calibrate {
            tolerance,
            max_iterations,
            free,
            sequential,
            ..
        } = &self.command
        {
            args.tolerance = *tolerance;
            args.max_iterations = *max_iterations;
            args.free = free.clone();
            args.sequential = *sequential;
        }
        args
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli.config_args())?;

    init_tracing(config.log_level.as_filter_str());
    info!(
        log_level = %config.log_level,
        horizon_periods = config.engine.horizon_periods,
        period_length_years = config.engine.period_length_years,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Compute {
            scenario,
            coefficients,
        } => commands::compute::run(
            &scenario,
            coefficients.as_deref(),
            config.engine,
            config.format,
        )?,
        Commands::Attribute {
            baseline,
            variant,
            coefficients,
            method,
        } => commands::attribute::run(
            &baseline,
            &variant,
            coefficients.as_deref(),
            &method,
            config.engine,
            config.format,
        )?,
        Commands::Calibrate {
            reference,
            initial,
            output,
            ..
        } => commands::calibrate::run(
            &reference,
            initial.as_deref(),
            output.as_deref(),
            config.engine,
            config.calibration.to_config()?,
            config.format,
        )?,
        Commands::Schema => commands::schema::run(config.format)?,
    }
    Ok(())
}
