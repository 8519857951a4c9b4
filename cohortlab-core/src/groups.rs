//! Group partitioning: assign subjects to ordinal groups by cutoff.
//!
//! Cutoffs split the value axis into left-inclusive groups:
//!
//! | cutoffs  | groups                                    |
//! |----------|-------------------------------------------|
//! | none     | all                                       |
//! | c1       | `X<=c1`, `X>c1`                            |
//! | c1 < c2  | `X<=c1`, `X>c1 && X<=c2`, `X>c2`          |
//!
//! A subject's group is the number of cutoffs strictly below its value,
//! which matches the CDF convention that the k-th value's percent counts
//! exactly the k values at or below it.

use serde::{Deserialize, Serialize};

use crate::config::GroupsConfig;
use crate::domain::CutoffPoint;

/// Label used for the single group when there are no cutoffs.
pub const ALL_LABEL: &str = "All";

/// One ordinal group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub index: usize,
    pub count: usize,
    /// Boundary in raw-value terms, e.g. `X>2.40 && X<=3.10`.
    pub value_label: String,
    /// Same boundary in percentile terms, e.g. `X>60.00% && X<=80.00%`.
    pub percent_label: String,
    pub color: String,
}

/// All groups for one partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupTable {
    pub groups: Vec<GroupSummary>,
    /// Subjects assigned to a group.
    pub total: usize,
    /// Subject values skipped because they were not finite.
    pub excluded: usize,
}

impl GroupTable {
    pub fn counts(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.count).collect()
    }
}

/// Partition resolved subject values by `cutoffs`.
///
/// `cutoffs` are sorted by value here, so callers may pass marker points
/// in any order. Produces `cutoffs.len() + 1` groups whose counts sum to
/// the number of finite values.
pub fn partition(values: &[f64], cutoffs: &[CutoffPoint], config: &GroupsConfig) -> GroupTable {
    let mut cuts: Vec<CutoffPoint> = cutoffs
        .iter()
        .copied()
        .filter(|c| c.value.is_finite() && c.percent.is_finite())
        .collect();
    cuts.sort_by(|a, b| a.value.total_cmp(&b.value));
    let bounds: Vec<f64> = cuts.iter().map(|c| c.value).collect();

    let mut counts = vec![0usize; bounds.len() + 1];
    let mut excluded = 0;
    for &v in values {
        if !v.is_finite() {
            excluded += 1;
            continue;
        }
        counts[bounds.partition_point(|&c| c < v)] += 1;
    }

    let label = config.variable_label.as_str();
    let groups = counts
        .iter()
        .enumerate()
        .map(|(index, &count)| {
            let lo = index.checked_sub(1).map(|i| &cuts[i]);
            let hi = cuts.get(index);
            GroupSummary {
                index,
                count,
                value_label: boundary_label(
                    label,
                    lo.map(|c| format!("{:.2}", c.value)),
                    hi.map(|c| format!("{:.2}", c.value)),
                ),
                percent_label: boundary_label(
                    label,
                    lo.map(|c| format!("{:.2}%", c.percent)),
                    hi.map(|c| format!("{:.2}%", c.percent)),
                ),
                color: group_color(config, index),
            }
        })
        .collect();

    GroupTable {
        groups,
        total: values.len() - excluded,
        excluded,
    }
}

fn boundary_label(var: &str, lo: Option<String>, hi: Option<String>) -> String {
    match (lo, hi) {
        (None, None) => ALL_LABEL.to_string(),
        (None, Some(hi)) => format!("{var}<={hi}"),
        (Some(lo), None) => format!("{var}>{lo}"),
        (Some(lo), Some(hi)) => format!("{var}>{lo} && {var}<={hi}"),
    }
}

/// Colour for group `index`, cycling through the palette.
pub fn group_color(config: &GroupsConfig, index: usize) -> String {
    if config.colors.is_empty() {
        return String::new();
    }
    config.colors[index % config.colors.len()].clone()
}
