//! CLI configuration management
//!
//! Handles loading configuration from a TOML file, `VALUER_*` environment
//! variables, and command-line flags.
//!
//! ```toml
//! log_level = "info"
//! format = "table"
//!
//! [engine]
//! horizon_periods = 10
//! period_length_years = 1.0
//!
//! [calibration]
//! tolerance = 1e-6
//! max_iterations = 500
//! free = ["cash_conversion", "adoption_speed", "discount_timing"]
//! deadline_secs = 30.0
//! parallel = true
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use valuer_core::Coefficient;
use valuer_models::EngineConfig;
use valuer_optimiser::CalibrationConfig;

/// Default configuration file, read from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "valuer.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid output format: {0}. Must be one of: table, json")]
    InvalidFormat(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Invalid engine configuration: {0}")]
    Engine(String),

    #[error("Invalid calibration configuration: {0}")]
    Calibration(String),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

/// Calibration settings as written in the configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub initial_step: f64,
    pub step_shrink: f64,
    pub min_step: f64,
    pub free: Vec<Coefficient>,
    /// Wall-clock limit in seconds
    pub deadline_secs: Option<f64>,
    pub parallel: bool,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        let defaults = CalibrationConfig::default();
        Self {
            tolerance: defaults.tolerance,
            max_iterations: defaults.max_iterations,
            initial_step: defaults.initial_step,
            step_shrink: defaults.step_shrink,
            min_step: defaults.min_step,
            free: defaults.free,
            deadline_secs: None,
            parallel: defaults.parallel,
        }
    }
}

impl CalibrationSettings {
    /// Convert to the optimiser's configuration.
    pub fn to_config(&self) -> Result<CalibrationConfig, ConfigError> {
        let mut config = CalibrationConfig::new(self.tolerance, self.max_iterations)
            .with_initial_step(self.initial_step)
            .with_step_shrink(self.step_shrink)
            .with_min_step(self.min_step)
            .with_free(self.free.iter().copied())
            .with_parallel(self.parallel);
        if let Some(secs) = self.deadline_secs {
            let deadline = Duration::try_from_secs_f64(secs)
                .map_err(|_| ConfigError::Calibration(format!("deadline_secs = {}", secs)))?;
            config = config.with_deadline(deadline);
        }
        config
            .validate()
            .map_err(|e| ConfigError::Calibration(e.to_string()))?;
        Ok(config)
    }
}

/// CLI configuration structure
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Log level
    pub log_level: LogLevel,
    /// Output format
    pub format: OutputFormat,
    /// Projection horizon
    pub engine: EngineConfig,
    /// Calibration search settings
    pub calibration: CalibrationSettings,
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: CliConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `VALUER_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("VALUER_LOG_LEVEL") {
            self.log_level = level.parse()?;
        }
        if let Some(format) = lookup("VALUER_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(v) = lookup("VALUER_HORIZON_PERIODS") {
            self.engine.horizon_periods = parse_value("VALUER_HORIZON_PERIODS", &v)?;
        }
        if let Some(v) = lookup("VALUER_PERIOD_LENGTH_YEARS") {
            self.engine.period_length_years = parse_value("VALUER_PERIOD_LENGTH_YEARS", &v)?;
        }
        if let Some(v) = lookup("VALUER_CALIBRATION_TOLERANCE") {
            self.calibration.tolerance = parse_value("VALUER_CALIBRATION_TOLERANCE", &v)?;
        }
        if let Some(v) = lookup("VALUER_CALIBRATION_MAX_ITERATIONS") {
            self.calibration.max_iterations =
                parse_value("VALUER_CALIBRATION_MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("VALUER_CALIBRATION_DEADLINE_SECS") {
            self.calibration.deadline_secs =
                Some(parse_value("VALUER_CALIBRATION_DEADLINE_SECS", &v)?);
        }
        if let Some(v) = lookup("VALUER_CALIBRATION_PARALLEL") {
            self.calibration.parallel = parse_value("VALUER_CALIBRATION_PARALLEL", &v)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .validate()
            .map_err(|e| ConfigError::Engine(e.to_string()))?;
        self.calibration.to_config()?;
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(level) = &cli.log_level {
            self.log_level = level.parse()?;
        }
        if let Some(format) = &cli.format {
            self.format = format.parse()?;
        }
        if let Some(periods) = cli.horizon_periods {
            self.engine.horizon_periods = periods;
        }
        if let Some(length) = cli.period_length_years {
            self.engine.period_length_years = length;
        }
        if let Some(tolerance) = cli.tolerance {
            self.calibration.tolerance = tolerance;
        }
        if let Some(max_iterations) = cli.max_iterations {
            self.calibration.max_iterations = max_iterations;
        }
        if let Some(free) = &cli.free {
            self.calibration.free = free.clone();
        }
        if cli.sequential {
            self.calibration.parallel = false;
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Configuration overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Output format override
    pub format: Option<String>,
    /// Horizon period count override
    pub horizon_periods: Option<usize>,
    /// Period length override
    pub period_length_years: Option<f64>,
    /// Calibration tolerance override
    pub tolerance: Option<f64>,
    /// Calibration sweep budget override
    pub max_iterations: Option<usize>,
    /// Free coefficient override
    pub free: Option<Vec<Coefficient>>,
    /// Force sequential case evaluation
    pub sequential: bool,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file (explicit path, else `valuer.toml` if present)
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    build_config_with(cli, |name| std::env::var(name).ok())
}

/// [`build_config`] with an explicit environment lookup.
pub fn build_config_with<F>(cli: &CliArgs, env: F) -> Result<CliConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            CliConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => CliConfig::default(),
    };

    config.apply_env(env)?;
    config.merge_with_cli(cli)?;
    config.validate()?;
    Ok(config)
}
