//! External interfaces: where rows come from and where confirmed cutoffs go.
//!
//! The editor core never performs I/O itself. A [`FeatureSource`] supplies
//! rows for a task/subgroup, and a [`ConfirmationSink`] receives confirmed
//! cutoffs and answers with authoritative group statistics. File-backed and
//! in-memory implementations are provided for the CLI and tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use super::load::{load_rows, LoadError};
use super::resolve::{resolve_subject_values, values_of};
use crate::coerce::coerce_str;
use crate::config::GroupsConfig;
use crate::cutoff::CutoffSeed;
use crate::domain::{AxisType, CutoffPoint, MarkerId, ObservationRow, RowSchema};
use crate::groups::{partition, GroupTable};

/// Errors from a source or sink.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("no rows for task '{task_id}' subgroup '{subgroup_id}'")]
    NotFound { task_id: String, subgroup_id: String },

    #[error("confirmation rejected: {0}")]
    Rejected(String),
}

/// Rows plus the metadata delivered with them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRows {
    pub rows: Vec<ObservationRow>,
    pub outcome_key: Option<String>,
    pub month_min: Option<i64>,
    pub month_max: Option<i64>,
    /// How `seed` cutoffs are expressed.
    pub axis_type: AxisType,
    pub seed: CutoffSeed,
}

impl FeatureRows {
    pub fn new(rows: Vec<ObservationRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Month range: the supplied bounds, else derived from the rows.
    pub fn month_range(&self) -> Option<(i64, i64)> {
        let months = || self.rows.iter().filter_map(|r| r.month);
        let min = self.month_min.or_else(|| months().min())?;
        let max = self.month_max.or_else(|| months().max())?;
        Some((min, max))
    }
}

/// Supplies observation rows (e.g. a feature-info service).
pub trait FeatureSource {
    fn fetch_feature_rows(
        &self,
        task_id: &str,
        subgroup_id: &str,
        month: Option<i64>,
    ) -> Result<FeatureRows, SourceError>;
}

/// Confirmed cutoffs, formatted for the wire.
///
/// `cutoffX` holds raw values with two decimals, `cutoffY` the matching
/// percentiles with two decimals and a `%` suffix, both sorted ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub month: Option<i64>,
    pub axis_type: AxisType,
    pub cutoff_x: Vec<String>,
    pub cutoff_y: Vec<String>,
}

impl ConfirmationRequest {
    pub fn from_cutoffs(month: Option<i64>, axis_type: AxisType, cutoffs: &[CutoffPoint]) -> Self {
        let mut sorted = cutoffs.to_vec();
        sorted.sort_by(|a, b| a.value.total_cmp(&b.value));
        Self {
            month,
            axis_type,
            cutoff_x: sorted.iter().map(|c| format!("{:.2}", c.value)).collect(),
            cutoff_y: sorted.iter().map(|c| format!("{:.2}%", c.percent)).collect(),
        }
    }

    /// Parse the wire strings back into cutoff points, skipping pairs that
    /// fail to parse.
    pub fn cutoff_points(&self) -> Vec<CutoffPoint> {
        self.cutoff_x
            .iter()
            .zip(&self.cutoff_y)
            .enumerate()
            .filter_map(|(i, (x, y))| {
                Some(CutoffPoint {
                    id: MarkerId(i),
                    value: coerce_str(x)?,
                    percent: coerce_str(y)?,
                })
            })
            .collect()
    }
}

/// Group statistics returned for a confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    pub groups: GroupTable,
    /// False when computed client-side rather than by the system of record.
    pub authoritative: bool,
}

/// Receives confirmed cutoffs.
pub trait ConfirmationSink {
    fn confirm(&self, request: &ConfirmationRequest) -> Result<ConfirmationResponse, SourceError>;
}

/// Rows read from a JSON or CSV file, whatever the task/subgroup.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    schema: RowSchema,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, schema: RowSchema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }
}

impl FeatureSource for FileSource {
    fn fetch_feature_rows(
        &self,
        _task_id: &str,
        _subgroup_id: &str,
        _month: Option<i64>,
    ) -> Result<FeatureRows, SourceError> {
        Ok(load_rows(&self.path, &self.schema)?)
    }
}

/// Rows keyed by `(task_id, subgroup_id)`.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    entries: HashMap<(String, String), FeatureRows>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task_id: &str, subgroup_id: &str, rows: FeatureRows) {
        self.entries
            .insert((task_id.to_string(), subgroup_id.to_string()), rows);
    }
}

impl FeatureSource for InMemorySource {
    fn fetch_feature_rows(
        &self,
        task_id: &str,
        subgroup_id: &str,
        _month: Option<i64>,
    ) -> Result<FeatureRows, SourceError> {
        self.entries
            .get(&(task_id.to_string(), subgroup_id.to_string()))
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                task_id: task_id.to_string(),
                subgroup_id: subgroup_id.to_string(),
            })
    }
}

/// Answers confirmations by partitioning locally. Useful offline; the
/// response is marked non-authoritative.
#[derive(Debug, Clone)]
pub struct LocalSink {
    rows: Vec<ObservationRow>,
    feature_key: String,
    groups: GroupsConfig,
}

impl LocalSink {
    pub fn new(rows: Vec<ObservationRow>, feature_key: impl Into<String>, groups: GroupsConfig) -> Self {
        Self {
            rows,
            feature_key: feature_key.into(),
            groups,
        }
    }
}

impl ConfirmationSink for LocalSink {
    fn confirm(&self, request: &ConfirmationRequest) -> Result<ConfirmationResponse, SourceError> {
        if request.cutoff_x.len() != request.cutoff_y.len() {
            return Err(SourceError::Rejected(format!(
                "{} values but {} percentiles",
                request.cutoff_x.len(),
                request.cutoff_y.len()
            )));
        }
        let resolved = resolve_subject_values(&self.rows, &self.feature_key, request.month);
        let groups = partition(&values_of(&resolved), &request.cutoff_points(), &self.groups);
        Ok(ConfirmationResponse {
            groups,
            authoritative: false,
        })
    }
}
