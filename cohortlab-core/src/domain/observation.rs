//! Observation rows: one measurement set for one subject at one time bucket.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::SubjectId;
use crate::coerce::{coerce_bucket, coerce_id, coerce_value};

/// Errors raised while adapting a raw record into an [`ObservationRow`].
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("row {index}: expected a JSON object")]
    NotAnObject { index: usize },

    #[error("row {index}: no subject id under any of {keys:?}")]
    MissingSubject { index: usize, keys: Vec<String> },
}

/// Which columns identify the subject and the time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSchema {
    /// Candidate subject-id columns, first match wins.
    pub subject_keys: Vec<String>,
    /// Time-bucket column (e.g. `month`).
    pub time_key: String,
}

impl RowSchema {
    /// True if `key` is a subject-id or time-bucket column.
    pub fn is_reserved(&self, key: &str) -> bool {
        key == self.time_key || self.subject_keys.iter().any(|k| k == key)
    }
}

impl Default for RowSchema {
    fn default() -> Self {
        Self {
            subject_keys: ["rid", "subject_id", "patient_id", "ptid", "id"]
                .into_iter()
                .map(String::from)
                .collect(),
            time_key: "month".to_string(),
        }
    }
}

/// One subject's measurements at one time bucket.
///
/// Feature cells are kept raw and in source column order; numeric
/// coercion happens lazily in [`ObservationRow::numeric`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub subject_id: SubjectId,
    /// `None` when the bucket column is absent or not integral.
    pub month: Option<i64>,
    pub features: Vec<(String, Value)>,
}

impl ObservationRow {
    pub fn new(subject_id: impl Into<String>, month: Option<i64>) -> Self {
        Self {
            subject_id: subject_id.into(),
            month,
            features: Vec::new(),
        }
    }

    /// Builder-style helper to append a feature cell.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.features.push((key.into(), value));
        self
    }

    /// Adapt a JSON record. `index` is only used for error reporting.
    pub fn from_json(index: usize, record: &Value, schema: &RowSchema) -> Result<Self, RowError> {
        let object = record.as_object().ok_or(RowError::NotAnObject { index })?;
        Self::from_object(index, object, schema)
    }

    pub fn from_object(
        index: usize,
        object: &Map<String, Value>,
        schema: &RowSchema,
    ) -> Result<Self, RowError> {
        let subject_id = schema
            .subject_keys
            .iter()
            .find_map(|k| object.get(k).and_then(coerce_id))
            .ok_or_else(|| RowError::MissingSubject {
                index,
                keys: schema.subject_keys.clone(),
            })?;

        let month = object.get(&schema.time_key).and_then(coerce_bucket);

        let features = object
            .iter()
            .filter(|(k, _)| !schema.is_reserved(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            subject_id,
            month,
            features,
        })
    }

    /// Raw cell for `key`, if the column exists on this row.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.features.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Coerced numeric value for `key`.
    pub fn numeric(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(coerce_value)
    }

    pub fn has_feature(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Feature column names in source order.
    pub fn feature_keys(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|(k, _)| k.as_str())
    }
}
