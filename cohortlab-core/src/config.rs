//! Editor configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) gives the
//! stock editor: one primary plus one additional marker, a 1-point gap,
//! a 5-point add-proximity threshold, and `rid`/`month` style rows.
//!
//! ```toml
//! [markers]
//! max_additional = 1
//! min_gap_percent = 1.0
//! add_proximity_percent = 5.0
//!
//! [rows]
//! subject_keys = ["rid", "subject_id"]
//! time_key = "month"
//! delta_markers = ["delta"]
//!
//! [groups]
//! variable_label = "ADAS13"
//! colors = ["#4C78A8", "#F58518", "#54A24B"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::RowSchema;
use crate::feature::FeatureKeyPolicy;

/// Errors from loading or validating an [`EditorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub markers: MarkersConfig,
    pub rows: RowsConfig,
    pub groups: GroupsConfig,
}

/// Marker limits and spacing, in percentile points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkersConfig {
    /// Additional markers allowed besides the primary one.
    pub max_additional: usize,
    /// Minimum separation kept between adjacent markers.
    pub min_gap_percent: f64,
    /// A new marker is declined within this distance of an existing one.
    pub add_proximity_percent: f64,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            max_additional: 1,
            min_gap_percent: crate::cutoff::DEFAULT_MIN_GAP,
            add_proximity_percent: 5.0,
        }
    }
}

/// Row column conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowsConfig {
    pub subject_keys: Vec<String>,
    pub time_key: String,
    pub delta_markers: Vec<String>,
}

impl Default for RowsConfig {
    fn default() -> Self {
        let schema = RowSchema::default();
        Self {
            subject_keys: schema.subject_keys,
            time_key: schema.time_key,
            delta_markers: FeatureKeyPolicy::default().delta_markers,
        }
    }
}

impl RowsConfig {
    pub fn schema(&self) -> RowSchema {
        RowSchema {
            subject_keys: self.subject_keys.clone(),
            time_key: self.time_key.clone(),
        }
    }

    pub fn key_policy(&self) -> FeatureKeyPolicy {
        FeatureKeyPolicy::new(self.delta_markers.clone())
    }
}

/// Group table presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupsConfig {
    /// Variable name used in boundary labels (`X<=2.40`).
    pub variable_label: String,
    /// Group colours, cycled when there are more groups than colours.
    pub colors: Vec<String>,
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            variable_label: "X".to_string(),
            colors: vec![
                "#4C78A8".to_string(),
                "#F58518".to_string(),
                "#54A24B".to_string(),
            ],
        }
    }
}

impl EditorConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.markers;
        if !(m.min_gap_percent.is_finite() && m.min_gap_percent > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "markers.min_gap_percent must be positive, got {}",
                m.min_gap_percent
            )));
        }
        if !(m.add_proximity_percent.is_finite() && m.add_proximity_percent >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "markers.add_proximity_percent must be non-negative, got {}",
                m.add_proximity_percent
            )));
        }
        if self.rows.subject_keys.is_empty() {
            return Err(ConfigError::Invalid("rows.subject_keys is empty".into()));
        }
        if self.rows.time_key.is_empty() {
            return Err(ConfigError::Invalid("rows.time_key is empty".into()));
        }
        if self.groups.colors.is_empty() {
            return Err(ConfigError::Invalid("groups.colors is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EditorConfig::from_toml("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.markers.max_additional, 1);
        assert_eq!(config.markers.min_gap_percent, 1.0);
        assert_eq!(config.rows.time_key, "month");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EditorConfig::from_toml(
            r#"
[markers]
max_additional = 2

[groups]
variable_label = "ADAS13"
"#,
        )
        .unwrap();
        assert_eq!(config.markers.max_additional, 2);
        assert_eq!(config.markers.add_proximity_percent, 5.0);
        assert_eq!(config.groups.variable_label, "ADAS13");
        assert_eq!(config.groups.colors.len(), 3);
    }

    #[test]
    fn rejects_non_positive_gap() {
        let err = EditorConfig::from_toml("[markers]\nmin_gap_percent = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_empty_palette() {
        let err = EditorConfig::from_toml("[groups]\ncolors = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = EditorConfig::from_toml("[markers\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EditorConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn rows_config_builds_schema_and_policy() {
        let rows = RowsConfig::default();
        assert!(rows.schema().is_reserved("rid"));
        assert!(rows.schema().is_reserved("month"));
        assert_eq!(rows.key_policy(), FeatureKeyPolicy::default());
    }
}
