//! Schema command implementation
//!
//! Lists the declared scenario parameters and engine coefficients.

use serde::Serialize;
use valuer_core::params::{ParameterBounds, ParameterSpec};
use valuer_core::{Coefficient, ParameterSchema};

use super::{table, to_json};
use crate::config::OutputFormat;
use crate::Result;

#[derive(Serialize)]
struct CoefficientRow {
    name: Coefficient,
    bounds: ParameterBounds,
    default: f64,
}

#[derive(Serialize)]
struct SchemaListing<'a> {
    parameters: &'a [ParameterSpec],
    coefficients: Vec<CoefficientRow>,
}

/// Run the schema command
pub fn run(format: OutputFormat) -> Result<()> {
    println!("{}", render(format)?);
    Ok(())
}

pub(crate) fn render(format: OutputFormat) -> Result<String> {
    let schema = ParameterSchema::standard();
    let coefficients: Vec<CoefficientRow> = Coefficient::ALL
        .into_iter()
        .map(|c| CoefficientRow {
            name: c,
            bounds: c.bounds(),
            default: c.default_value(),
        })
        .collect();

    if format == OutputFormat::Json {
        return to_json(&SchemaListing {
            parameters: schema.specs(),
            coefficients,
        });
    }

    let parameters: Vec<Vec<String>> = schema
        .specs()
        .iter()
        .map(|s| {
            vec![
                s.key.flat(),
                range(&s.bounds),
                s.description.clone(),
            ]
        })
        .collect();
    let coefficients: Vec<Vec<String>> = coefficients
        .iter()
        .map(|c| {
            vec![
                c.name.to_string(),
                range(&c.bounds),
                c.default.to_string(),
            ]
        })
        .collect();

    let mut out = table(&["Parameter", "Range", "Description"], &parameters);
    out.push_str(&table(&["Coefficient", "Range", "Default"], &coefficients));
    Ok(out)
}

fn range(bounds: &ParameterBounds) -> String {
    format!("[{}, {}]", bounds.min, bounds.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_key() {
        let rendered = render(OutputFormat::Table).unwrap();
        for key in ParameterSchema::standard().keys() {
            assert!(rendered.contains(&key.flat()), "{} missing", key);
        }
        for c in Coefficient::ALL {
            assert!(rendered.contains(c.name()));
        }
    }

    #[test]
    fn test_json_listing() {
        let json: serde_json::Value =
            serde_json::from_str(&render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["parameters"].as_array().unwrap().len(), 8);
        assert_eq!(json["coefficients"][0]["name"], "cash_conversion");
        assert_eq!(json["coefficients"][0]["default"], 0.25);
    }
}
