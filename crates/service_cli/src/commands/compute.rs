//! Compute command implementation
//!
//! Values one scenario file with the configured horizon.

use std::path::Path;
use tracing::info;
use valuer_models::{EngineConfig, ValuationEngine, ValuationResult};

use super::{load_coefficients, load_scenario, money, table, to_json};
use crate::config::OutputFormat;
use crate::Result;

/// Run the compute command
pub fn run(
    scenario: &Path,
    coefficients: Option<&Path>,
    engine: EngineConfig,
    format: OutputFormat,
) -> Result<()> {
    info!("Computing valuation...");
    info!("  Scenario: {}", scenario.display());
    info!(
        "  Horizon: {} periods of {} years",
        engine.horizon_periods, engine.period_length_years
    );

    let result = value(scenario, coefficients, engine)?;
    let output = render(&result, format)?;
    println!("{}", output);

    info!(total = result.total_valuation(), "Valuation complete");
    Ok(())
}

pub(crate) fn value(
    scenario: &Path,
    coefficients: Option<&Path>,
    engine: EngineConfig,
) -> Result<ValuationResult> {
    let params = load_scenario(scenario)?;
    let coefficients = load_coefficients(coefficients)?;
    let engine = ValuationEngine::new(engine)?;
    Ok(engine.compute(&params, &coefficients)?)
}

pub(crate) fn render(result: &ValuationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(result),
        OutputFormat::Table => {
            let mut rows: Vec<Vec<String>> = result
                .periods()
                .iter()
                .map(|p| {
                    vec![
                        p.period.to_string(),
                        format!("{:.2}", p.time),
                        money(p.revenue),
                        money(p.cash_flow),
                        format!("{:.6}", p.discount_factor),
                        money(p.discounted_cash_flow),
                    ]
                })
                .collect();
            let mut out = table(
                &["Period", "Time", "Revenue", "Cash flow", "Discount", "PV"],
                &rows,
            );

            rows = vec![
                vec!["Present value".to_string(), money(result.present_value())],
                vec!["Terminal value".to_string(), money(result.terminal_value())],
                vec![
                    "Discounted terminal value".to_string(),
                    money(result.discounted_terminal_value()),
                ],
                vec!["Total valuation".to_string(), money(result.total_valuation())],
            ];
            out.push_str(&table(&["Figure", "Value"], &rows));
            Ok(out)
        }
    }
}
