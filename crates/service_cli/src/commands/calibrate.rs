//! Calibrate command implementation
//!
//! Fits the engine coefficients to a reference table (TOML or CSV) and
//! optionally writes the result as a coefficient file.

use std::path::Path;
use tracing::{info, warn};
use valuer_core::ParameterSchema;
use valuer_models::{EngineConfig, ValuationEngine};
use valuer_optimiser::{
    load_cases, CalibrationConfig, CalibrationOutcome, CoordinateDescentCalibrator,
};

use super::{load_coefficients, table, to_json};
use crate::config::OutputFormat;
use crate::{CliError, Result};

/// Run the calibrate command
pub fn run(
    reference: &Path,
    initial: Option<&Path>,
    output: Option<&Path>,
    engine: EngineConfig,
    config: CalibrationConfig,
    format: OutputFormat,
) -> Result<()> {
    info!("Starting calibration...");
    info!("  Reference: {}", reference.display());
    info!("  Tolerance: {}", config.tolerance);
    info!("  Max iterations: {}", config.max_iterations);

    let outcome = match calibrate(reference, initial, engine, config) {
        Ok(outcome) => outcome,
        Err(CliError::Calibration(e)) => {
            if let Some(best) = e.best_coefficients() {
                warn!(coefficients = ?best, "Best coefficients found before stopping");
            }
            return Err(CliError::Calibration(e));
        }
        Err(e) => return Err(e),
    };

    println!("{}", render(&outcome, format)?);
    if let Some(path) = output {
        write_coefficients(&outcome, path)?;
        info!("Calibrated coefficients written to {}", path.display());
    }

    info!("Calibration complete");
    Ok(())
}

pub(crate) fn calibrate(
    reference: &Path,
    initial: Option<&Path>,
    engine: EngineConfig,
    config: CalibrationConfig,
) -> Result<CalibrationOutcome> {
    if !reference.exists() {
        return Err(CliError::FileNotFound(reference.display().to_string()));
    }
    let cases = load_cases(reference, &ParameterSchema::standard())?;
    info!("  Cases: {}", cases.len());
    let initial = load_coefficients(initial)?;
    let engine = ValuationEngine::new(engine)?;

    Ok(CoordinateDescentCalibrator::new(&engine, config).calibrate(&cases, &initial)?)
}

/// Write calibrated coefficients as a TOML file `compute --coefficients` reads.
pub(crate) fn write_coefficients(outcome: &CalibrationOutcome, path: &Path) -> Result<()> {
    let text = toml::to_string(&outcome.coefficients).map_err(|e| CliError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    std::fs::write(path, text)?;
    Ok(())
}

pub(crate) fn render(outcome: &CalibrationOutcome, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(outcome);
    }

    let coefficients: Vec<Vec<String>> = outcome
        .coefficients
        .iter()
        .map(|(c, v)| vec![c.name().to_string(), format!("{:.8}", v)])
        .collect();
    let cases: Vec<Vec<String>> = outcome
        .case_errors
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                format!("{:.3e}", c.error),
                c.tolerance.map_or_else(|| "-".to_string(), |t| format!("{:.1e}", t)),
            ]
        })
        .collect();

    let mut out = format!(
        "Converged after {} sweeps ({} accepted moves, {:.3?}): aggregate error {:.3e}\n",
        outcome.iterations,
        outcome.accepted_moves(),
        outcome.elapsed,
        outcome.aggregate_error
    );
    out.push_str(&table(&["Coefficient", "Value"], &coefficients));
    out.push_str(&table(&["Case", "Error", "Tolerance"], &cases));
    Ok(out)
}
