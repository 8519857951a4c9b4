//! Feature-key resolution policy.
//!
//! When the caller does not name the feature to plot, one is chosen from
//! the row's columns by an ordered list of fallbacks:
//!
//! 1. an explicit key, used verbatim
//! 2. the first column whose name contains a delta marker (`delta`, ...)
//! 3. the caller-supplied outcome key, if the row has that column
//! 4. the first column that is neither a subject id nor the time bucket
//!
//! Reserved columns are already stripped from [`ObservationRow::features`],
//! so rule 4 is simply "first feature column".

use serde::{Deserialize, Serialize};

use crate::domain::ObservationRow;

/// Which rule picked the feature key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    Explicit,
    DeltaMarker,
    Outcome,
    FirstField,
}

/// A resolved feature key plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedKey {
    pub key: String,
    pub source: KeySource,
}

/// Ordered fallback policy for picking a feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureKeyPolicy {
    /// Substrings marking a change-from-baseline column, matched case-insensitively.
    pub delta_markers: Vec<String>,
}

impl Default for FeatureKeyPolicy {
    fn default() -> Self {
        Self {
            delta_markers: vec!["delta".to_string()],
        }
    }
}

impl FeatureKeyPolicy {
    pub fn new(delta_markers: Vec<String>) -> Self {
        Self { delta_markers }
    }

    /// Resolve the feature key against a sample row.
    ///
    /// Returns `None` only when nothing is explicit and the row has no
    /// feature columns at all.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        outcome_key: Option<&str>,
        sample: Option<&ObservationRow>,
    ) -> Option<ResolvedKey> {
        if let Some(key) = explicit.filter(|k| !k.is_empty()) {
            return Some(ResolvedKey {
                key: key.to_string(),
                source: KeySource::Explicit,
            });
        }

        let row = sample?;

        if let Some(key) = row.feature_keys().find(|k| self.is_delta(k)) {
            return Some(ResolvedKey {
                key: key.to_string(),
                source: KeySource::DeltaMarker,
            });
        }

        if let Some(key) = outcome_key.filter(|k| row.has_feature(k)) {
            return Some(ResolvedKey {
                key: key.to_string(),
                source: KeySource::Outcome,
            });
        }

        row.feature_keys().next().map(|key| ResolvedKey {
            key: key.to_string(),
            source: KeySource::FirstField,
        })
    }

    fn is_delta(&self, key: &str) -> bool {
        let lower = key.to_lowercase();
        self.delta_markers
            .iter()
            .filter(|m| !m.is_empty())
            .any(|m| lower.contains(&m.to_lowercase()))
    }
}
