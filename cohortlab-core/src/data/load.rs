//! Row loading from JSON and CSV files.
//!
//! JSON files hold either a bare array of row objects or a document:
//!
//! ```json
//! { "rows": [...], "outcomeKey": "adas13", "monthMin": 0, "monthMax": 24,
//!   "axisType": "y_percent", "cutoffs": ["30%", "70%"] }
//! ```
//!
//! CSV files have a header row; every cell is kept as a string and coerced
//! later, so blank or `NA` cells simply drop out of the curve.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::source::FeatureRows;
use crate::cutoff::CutoffSeed;
use crate::domain::{AxisType, ObservationRow, RowError, RowSchema};

/// Errors from the row loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Row(#[from] RowError),

    #[error("unsupported file type {0} (expected .json or .csv)")]
    UnsupportedFormat(PathBuf),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowsDocument {
    rows: Vec<Value>,
    #[serde(default)]
    outcome_key: Option<String>,
    #[serde(default)]
    month_min: Option<i64>,
    #[serde(default)]
    month_max: Option<i64>,
    #[serde(default)]
    axis_type: AxisType,
    #[serde(default)]
    cutoffs: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RowsFile {
    Bare(Vec<Value>),
    Document(RowsDocument),
}

/// Load rows from a `.json` or `.csv` file.
pub fn load_rows(path: &Path, schema: &RowSchema) -> Result<FeatureRows, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let rows = match ext.as_deref() {
        Some("json") => parse_json(&std::fs::read_to_string(path).map_err(io_err)?, schema)?,
        Some("csv") => parse_csv(std::fs::File::open(path).map_err(io_err)?, schema)?,
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };

    info!(path = %path.display(), rows = rows.rows.len(), "loaded observation rows");
    Ok(rows)
}

/// Parse a JSON rows file (bare array or document).
pub fn parse_json(content: &str, schema: &RowSchema) -> Result<FeatureRows, LoadError> {
    let file: RowsFile = serde_json::from_str(content)?;
    let doc = match file {
        RowsFile::Bare(rows) => RowsDocument {
            rows,
            outcome_key: None,
            month_min: None,
            month_max: None,
            axis_type: AxisType::default(),
            cutoffs: Vec::new(),
        },
        RowsFile::Document(doc) => doc,
    };

    let rows = doc
        .rows
        .iter()
        .enumerate()
        .map(|(i, record)| ObservationRow::from_json(i, record, schema))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureRows {
        rows,
        outcome_key: doc.outcome_key,
        month_min: doc.month_min,
        month_max: doc.month_max,
        axis_type: doc.axis_type,
        seed: CutoffSeed {
            axis_type: doc.axis_type,
            cutoffs: doc.cutoffs,
        },
    })
}

/// Parse CSV rows with a header line.
pub fn parse_csv<R: Read>(reader: R, schema: &RowSchema) -> Result<FeatureRows, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let object: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, cell)| (h.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(ObservationRow::from_object(i, &object, schema)?);
    }

    Ok(FeatureRows::new(rows))
}
