//! Reference table loaders.
//!
//! Reference tables hold calibration cases exported from a trusted source.
//! Two layouts are read:
//!
//! TOML, one `[[cases]]` table per case:
//!
//! ```toml
//! [[cases]]
//! id = "base"
//! tolerance = 0.01            # optional
//! expected_total = 1.25e7     # or a [cases.expected] table
//!
//! [cases.parameters.financial]
//! discount_rate = 0.10
//! terminal_growth = 0.03
//! dilution_factor = 1.0
//!
//! [cases.parameters.market]
//! market_volume = 2500000.0
//! # ...
//! ```
//!
//! CSV, one row per case with columns `id`, `expected_total`, an optional
//! `tolerance`, and one `domain.parameter` column per input. Empty parameter
//! cells are left out of the set, so the engine reports them as missing.

use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use valuer_core::params::{ParameterDocument, ParameterKey, ParameterSchema};
use valuer_core::{ParameterSet, ValuationError};

use crate::calibration::{CalibrationCase, ExpectedOutcome, ExpectedValuation};

/// Errors raised while loading a reference table.
#[derive(Error, Debug)]
pub enum ReferenceError {
    /// File could not be read.
    #[error("Failed to read reference table: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax or shape error.
    #[error("Invalid TOML reference table: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV syntax error.
    #[error("Invalid CSV reference table: {0}")]
    Csv(#[from] csv::Error),

    /// A record is well-formed but unusable.
    #[error("Reference case '{case}': {message}")]
    Record {
        /// Case id, or the row position when the id is unknown
        case: String,
        /// What is wrong
        message: String,
    },

    /// A record's parameters fail validation.
    #[error("Reference case '{case}': {source}")]
    Valuation {
        /// Case id
        case: String,
        /// Underlying validation error
        #[source]
        source: ValuationError,
    },

    /// File extension is neither `.toml` nor `.csv`.
    #[error("Unsupported reference table format: {0}")]
    UnsupportedFormat(String),
}

impl ReferenceError {
    fn record(case: impl Into<String>, message: impl Into<String>) -> Self {
        ReferenceError::Record {
            case: case.into(),
            message: message.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceFile {
    #[serde(default)]
    cases: Vec<ReferenceRecord>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceRecord {
    id: String,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    expected_total: Option<f64>,
    #[serde(default)]
    expected: Option<ExpectedValuation>,
    #[serde(default)]
    parameters: ParameterDocument,
}

impl ReferenceRecord {
    fn into_case(self, schema: &Arc<ParameterSchema>) -> Result<CalibrationCase, ReferenceError> {
        let expected = match (self.expected_total, self.expected) {
            (Some(total), None) => ExpectedOutcome::Total(total),
            (None, Some(full)) => ExpectedOutcome::Full(full),
            (Some(_), Some(_)) => {
                return Err(ReferenceError::record(
                    self.id,
                    "give either expected_total or an expected table, not both",
                ))
            }
            (None, None) => {
                return Err(ReferenceError::record(
                    self.id,
                    "no expected_total or expected table",
                ))
            }
        };
        let parameters = ParameterSet::from_document(Arc::clone(schema), &self.parameters)
            .map_err(|source| ReferenceError::Valuation {
                case: self.id.clone(),
                source,
            })?;
        Ok(CalibrationCase {
            id: self.id,
            parameters,
            expected,
            tolerance: self.tolerance,
        })
    }
}

/// Parse a TOML reference table.
pub fn from_toml_str(
    text: &str,
    schema: &Arc<ParameterSchema>,
) -> Result<Vec<CalibrationCase>, ReferenceError> {
    let file: ReferenceFile = toml::from_str(text)?;
    file.cases
        .into_iter()
        .map(|record| record.into_case(schema))
        .collect()
}

/// Parse a CSV reference table.
pub fn from_csv_reader<R: Read>(
    reader: R,
    schema: &Arc<ParameterSchema>,
) -> Result<Vec<CalibrationCase>, ReferenceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut id_column = None;
    let mut total_column = None;
    let mut tolerance_column = None;
    let mut parameter_columns = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        match header {
            "id" => id_column = Some(index),
            "expected_total" => total_column = Some(index),
            "tolerance" => tolerance_column = Some(index),
            other => {
                let key: ParameterKey = other.parse().map_err(|source| {
                    ReferenceError::Valuation {
                        case: "<header>".to_string(),
                        source,
                    }
                })?;
                parameter_columns.push((index, key));
            }
        }
    }
    let id_column = id_column.ok_or_else(|| ReferenceError::record("<header>", "no 'id' column"))?;
    let total_column = total_column
        .ok_or_else(|| ReferenceError::record("<header>", "no 'expected_total' column"))?;

    let mut cases = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let id = record.get(id_column).unwrap_or_default().to_string();
        if id.is_empty() {
            return Err(ReferenceError::record(format!("row {}", row + 1), "empty id"));
        }

        let mut builder = ParameterSet::builder(Arc::clone(schema));
        for (index, key) in &parameter_columns {
            if let Some(value) = parse_cell(&id, key.flat().as_str(), record.get(*index))? {
                builder = builder.set_key(key.clone(), value);
            }
        }
        let parameters = builder.build().map_err(|source| ReferenceError::Valuation {
            case: id.clone(),
            source,
        })?;

        let expected_total = parse_cell(&id, "expected_total", record.get(total_column))?
            .ok_or_else(|| ReferenceError::record(&id, "empty expected_total"))?;
        let tolerance = match tolerance_column {
            Some(index) => parse_cell(&id, "tolerance", record.get(index))?,
            None => None,
        };

        cases.push(CalibrationCase {
            id,
            parameters,
            expected: ExpectedOutcome::Total(expected_total),
            tolerance,
        });
    }
    Ok(cases)
}

fn parse_cell(case: &str, column: &str, cell: Option<&str>) -> Result<Option<f64>, ReferenceError> {
    match cell {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<f64>().map(Some).map_err(|_| {
            ReferenceError::record(case, format!("column '{}': '{}' is not a number", column, text))
        }),
    }
}

/// Load a reference table, choosing the layout by file extension.
pub fn load_cases(
    path: &Path,
    schema: &Arc<ParameterSchema>,
) -> Result<Vec<CalibrationCase>, ReferenceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("toml") => from_toml_str(&fs::read_to_string(path)?, schema),
        Some("csv") => from_csv_reader(fs::File::open(path)?, schema),
        _ => Err(ReferenceError::UnsupportedFormat(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuer_core::params::standard::*;

    const TOML_TABLE: &str = r#"
[[cases]]
id = "scalar"
tolerance = 0.02
expected_total = 1500.0

[cases.parameters.financial]
discount_rate = 0.10
terminal_growth = 0.03

[[cases]]
id = "full"

[cases.expected]
cash_flows = [1.0, 2.0]
present_value = 2.5
terminal_value = 30.0
total_valuation = 25.0

[cases.parameters.market]
market_volume = 1000.0
"#;

    #[test]
    fn test_toml_both_layouts() {
        let cases = from_toml_str(TOML_TABLE, &ParameterSchema::standard()).unwrap();
        assert_eq!(cases.len(), 2);

        assert_eq!(cases[0].id, "scalar");
        assert_eq!(cases[0].tolerance, Some(0.02));
        assert_eq!(cases[0].expected, ExpectedOutcome::Total(1500.0));
        assert_eq!(cases[0].parameters.value(FINANCIAL, DISCOUNT_RATE), Some(0.10));

        match &cases[1].expected {
            ExpectedOutcome::Full(full) => assert_eq!(full.cash_flows, vec![1.0, 2.0]),
            other => panic!("expected full outcome, got {other:?}"),
        }
        assert_eq!(cases[1].parameters.len(), 1);
    }

    #[test]
    fn test_toml_rejects_double_expectation() {
        let text = r#"
[[cases]]
id = "both"
expected_total = 1.0
[cases.expected]
cash_flows = []
present_value = 0.0
terminal_value = 0.0
total_valuation = 1.0
"#;
        let err = from_toml_str(text, &ParameterSchema::standard()).unwrap_err();
        assert!(matches!(err, ReferenceError::Record { ref case, .. } if case == "both"));
    }

    #[test]
    fn test_toml_out_of_range_names_case() {
        let text = r#"
[[cases]]
id = "bad"
expected_total = 1.0
[cases.parameters.financial]
dilution_factor = 1.5
"#;
        let err = from_toml_str(text, &ParameterSchema::standard()).unwrap_err();
        match err {
            ReferenceError::Valuation { case, source } => {
                assert_eq!(case, "bad");
                assert!(matches!(source, ValuationError::InvalidParameter { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_csv_rows() {
        let text = "\
id,financial.discount_rate,market.penetration_rate,expected_total,tolerance
a,0.10,0.05,1200.5,
b,0.12,,900.0,0.01
";
        let cases = from_csv_reader(text.as_bytes(), &ParameterSchema::standard()).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].tolerance, None);
        assert_eq!(cases[0].parameters.len(), 2);
        assert_eq!(cases[1].tolerance, Some(0.01));
        assert_eq!(cases[1].parameters.value(MARKET, PENETRATION_RATE), None);
        assert_eq!(cases[1].expected.total(), 900.0);
    }

    #[test]
    fn test_csv_requires_id_column() {
        let text = "financial.discount_rate,expected_total\n0.1,5.0\n";
        let err = from_csv_reader(text.as_bytes(), &ParameterSchema::standard()).unwrap_err();
        assert!(format!("{}", err).contains("'id'"));
    }

    #[test]
    fn test_csv_bad_number_names_column() {
        let text = "id,financial.discount_rate,expected_total\nx,ten,5.0\n";
        let err = from_csv_reader(text.as_bytes(), &ParameterSchema::standard()).unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("'x'"));
        assert!(msg.contains("financial.discount_rate"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_cases(Path::new("cases.xlsx"), &ParameterSchema::standard()).unwrap_err();
        assert!(matches!(err, ReferenceError::UnsupportedFormat(_)));
    }
}
