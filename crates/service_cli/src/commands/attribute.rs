//! Attribute command implementation
//!
//! Values a baseline and a variant scenario, then splits the change in
//! total valuation across the parameters that differ.

use std::path::Path;
use tracing::info;
use valuer_models::{EngineConfig, ValuationEngine};
use valuer_risk::{AttributionEngine, AttributionMethod, AttributionReport};

use super::{load_coefficients, load_scenario, money, table, to_json};
use crate::config::OutputFormat;
use crate::{CliError, Result};

/// Run the attribute command
pub fn run(
    baseline: &Path,
    variant: &Path,
    coefficients: Option<&Path>,
    method: &str,
    engine: EngineConfig,
    format: OutputFormat,
) -> Result<()> {
    info!("Attributing valuation change...");
    info!("  Baseline: {}", baseline.display());
    info!("  Variant: {}", variant.display());
    info!("  Method: {}", method);

    let method: AttributionMethod = method
        .parse()
        .map_err(|_| CliError::InvalidArgument(format!(
            "Unknown attribution method: {}. Supported: one_at_a_time, sequential",
            method
        )))?;
    let report = attribute(baseline, variant, coefficients, method, engine)?;
    println!("{}", render(&report, format)?);

    info!(
        delta = report.total_delta(),
        residual = report.residual(),
        "Attribution complete"
    );
    Ok(())
}

pub(crate) fn attribute(
    baseline: &Path,
    variant: &Path,
    coefficients: Option<&Path>,
    method: AttributionMethod,
    engine: EngineConfig,
) -> Result<AttributionReport> {
    let baseline_params = load_scenario(baseline)?;
    let variant_params = load_scenario(variant)?;
    let coefficients = load_coefficients(coefficients)?;
    let engine = ValuationEngine::new(engine)?;

    let baseline_result = engine.compute(&baseline_params, &coefficients)?;
    let variant_result = engine.compute(&variant_params, &coefficients)?;

    let report = AttributionEngine::new(engine).with_method(method).attribute(
        &coefficients,
        &baseline_params,
        &baseline_result,
        &variant_params,
        &variant_result,
    )?;
    Ok(report)
}

pub(crate) fn render(report: &AttributionReport, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let delta = report.total_delta();
    let mut rows: Vec<Vec<String>> = report
        .entries()
        .iter()
        .map(|e| {
            vec![
                e.key.flat(),
                format!("{}", e.baseline_value),
                format!("{}", e.variant_value),
                money(e.contribution),
                format!("{:.1}%", e.share(delta) * 100.0),
            ]
        })
        .collect();
    rows.push(vec![
        "(residual)".to_string(),
        String::new(),
        String::new(),
        money(report.residual()),
        format!("{:.1}%", share(report.residual(), delta) * 100.0),
    ]);

    let mut out = format!(
        "Baseline {} → variant {} (delta {}, method {})\n",
        money(report.baseline_total()),
        money(report.variant_total()),
        money(delta),
        report.method()
    );
    out.push_str(&table(
        &["Parameter", "Baseline", "Variant", "Contribution", "Share"],
        &rows,
    ));
    Ok(out)
}

fn share(part: f64, total: f64) -> f64 {
    if total != 0.0 {
        part / total
    } else {
        0.0
    }
}
