//! Per-subject resolution: one value per subject for a selected month.
//!
//! For each subject, among rows whose value coerces to a number:
//! 1. the entry at the selected month, if present
//! 2. otherwise the latest entry before it
//! 3. otherwise the earliest entry (all entries are later)
//!
//! Rows with no month are used only when a subject has no dated entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{ObservationRow, SubjectId};

/// A subject's resolved observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectValue {
    pub subject_id: SubjectId,
    /// Month the value was taken from (`None` for undated rows).
    pub month: Option<i64>,
    pub value: f64,
}

/// Resolve one value of `key` per subject, sorted by subject id.
///
/// With `month == None` the latest dated entry is used.
pub fn resolve_subject_values(
    rows: &[ObservationRow],
    key: &str,
    month: Option<i64>,
) -> Vec<SubjectValue> {
    let mut by_subject: BTreeMap<&str, Vec<(Option<i64>, f64)>> = BTreeMap::new();
    for row in rows {
        if let Some(v) = row.numeric(key) {
            by_subject
                .entry(row.subject_id.as_str())
                .or_default()
                .push((row.month, v));
        }
    }

    by_subject
        .into_iter()
        .filter_map(|(subject, entries)| {
            pick(&entries, month).map(|(month, value)| SubjectValue {
                subject_id: subject.to_string(),
                month,
                value,
            })
        })
        .collect()
}

fn pick(entries: &[(Option<i64>, f64)], month: Option<i64>) -> Option<(Option<i64>, f64)> {
    let target = month.unwrap_or(i64::MAX);
    let dated = || entries.iter().filter_map(|&(m, v)| m.map(|m| (m, v)));

    // Latest month <= target covers both "at" and "latest earlier".
    let at_or_before = dated().filter(|&(m, _)| m <= target).max_by_key(|&(m, _)| m);
    let earliest = || dated().min_by_key(|&(m, _)| m);

    at_or_before
        .or_else(earliest)
        .map(|(m, v)| (Some(m), v))
        .or_else(|| entries.iter().rev().find(|(m, _)| m.is_none()).copied())
}

/// Just the values, in subject order.
pub fn values_of(resolved: &[SubjectValue]) -> Vec<f64> {
    resolved.iter().map(|s| s.value).collect()
}
