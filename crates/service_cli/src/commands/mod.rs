//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands render their
//! output to a `String` so it can be checked without capturing stdout.

pub mod attribute;
pub mod calibrate;
pub mod compute;
pub mod schema;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use valuer_core::params::ParameterDocument;
use valuer_core::{CoefficientSet, ParameterSchema, ParameterSet};

use crate::{CliError, Result};

/// Read a TOML or JSON file into `T`, choosing the parser by extension.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    let parse_error = |message: String| CliError::Parse {
        path: path.display().to_string(),
        message,
    };
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("toml") => toml::from_str(&text).map_err(|e| parse_error(e.to_string())),
        Some("json") => serde_json::from_str(&text).map_err(|e| parse_error(e.to_string())),
        _ => Err(CliError::InvalidArgument(format!(
            "{}: expected a .toml or .json file",
            path.display()
        ))),
    }
}

/// Load a scenario file (`[financial]`, `[market]` tables) into a
/// parameter set over the standard schema.
pub(crate) fn load_scenario(path: &Path) -> Result<ParameterSet> {
    let document: ParameterDocument = read_document(path)?;
    Ok(ParameterSet::from_document(
        ParameterSchema::standard(),
        &document,
    )?)
}

/// Load coefficients, or the uncalibrated defaults when no file is given.
pub(crate) fn load_coefficients(path: Option<&Path>) -> Result<CoefficientSet> {
    match path {
        Some(path) => read_document(path),
        None => Ok(CoefficientSet::standard()),
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Box-drawn table.
pub(crate) fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(headers[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}\n", left, segments.join(mid), right)
    };
    let line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!(" {:<width$} ", cell, width = w)
            })
            .collect();
        format!("│{}│\n", padded.join("│"))
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = rule("┌", "┬", "┐");
    out.push_str(&line(&header_cells));
    out.push_str(&rule("├", "┼", "┤"));
    for row in rows {
        out.push_str(&line(row));
    }
    out.push_str(&rule("└", "┴", "┘"));
    out
}

pub(crate) fn money(value: f64) -> String {
    format!("{:.2}", value)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use tempfile::TempDir;
    use valuer_core::{Coefficient, ValuationError};

    #[test]
    fn test_load_scenario_toml_and_json_agree() {
        let dir = TempDir::new().unwrap();
        let toml_path = write(&dir, "base.toml", BASELINE);
        let from_toml = load_scenario(&toml_path).unwrap();

        let json = serde_json::to_string(&from_toml).unwrap();
        let json_path = write(&dir, "base.json", &json);
        let from_json = load_scenario(&json_path).unwrap();

        assert_eq!(from_toml, from_json);
        assert_eq!(from_toml.len(), 8);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_scenario(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "base.yaml", BASELINE);
        assert!(matches!(
            load_scenario(&path),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.toml", "[financial]\ntax_rate = 0.2\n");
        assert!(matches!(
            load_scenario(&path),
            Err(CliError::Valuation(ValuationError::UnknownParameter { .. }))
        ));
    }

    #[test]
    fn test_load_coefficients() {
        assert_eq!(load_coefficients(None).unwrap(), CoefficientSet::standard());

        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "coefficients.toml",
            "cash_conversion = 0.3\nadoption_speed = 2.0\ndiscount_timing = 0.5\n",
        );
        let loaded = load_coefficients(Some(&path)).unwrap();
        assert_eq!(loaded.get(Coefficient::AdoptionSpeed), 2.0);
    }

    #[test]
    fn test_table_layout() {
        let rendered = table(
            &["Key", "Value"],
            &[vec!["a".to_string(), "12345".to_string()]],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "┌─────┬───────┐");
        assert_eq!(lines[1], "│ Key │ Value │");
        assert_eq!(lines[3], "│ a   │ 12345 │");
    }
}
