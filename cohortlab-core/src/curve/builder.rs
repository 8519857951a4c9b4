//! Empirical CDF builder.
//!
//! Rows → (month filter, with fallback to all rows) → feature-key policy →
//! numeric coercion → ascending sort → `100*(i+1)/N` percents.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Cdf, ObservationRow};
use crate::feature::{FeatureKeyPolicy, KeySource};

/// What to build a CDF from.
#[derive(Debug, Clone, Copy, Default)]
pub struct CdfRequest<'a> {
    /// Explicit feature column; resolved by policy when `None`.
    pub feature_key: Option<&'a str>,
    /// Outcome column supplied alongside the rows.
    pub outcome_key: Option<&'a str>,
    /// Time-bucket filter; `None` uses every row.
    pub month: Option<i64>,
}

/// A CDF plus the provenance needed to explain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltCdf {
    pub feature_key: Option<String>,
    pub key_source: Option<KeySource>,
    pub month: Option<i64>,
    /// The month filter matched nothing and all rows were used instead.
    pub month_fallback: bool,
    /// Rows whose value failed numeric coercion.
    pub dropped: usize,
    pub cdf: Cdf,
}

impl BuiltCdf {
    fn empty(month: Option<i64>, month_fallback: bool) -> Self {
        Self {
            feature_key: None,
            key_source: None,
            month,
            month_fallback,
            dropped: 0,
            cdf: Cdf::empty(),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.cdf.is_empty()
    }
}

/// Build an empirical CDF for one feature at one time bucket.
///
/// Never fails: unparseable cells are dropped and "no usable data" is an
/// empty CDF.
pub fn build_cdf(rows: &[ObservationRow], request: &CdfRequest<'_>, policy: &FeatureKeyPolicy) -> BuiltCdf {
    let mut selected: Vec<&ObservationRow> = match request.month {
        Some(m) => rows.iter().filter(|r| r.month == Some(m)).collect(),
        None => rows.iter().collect(),
    };

    let month_fallback = selected.is_empty() && !rows.is_empty();
    if month_fallback {
        warn!(
            month = ?request.month,
            rows = rows.len(),
            "month filter matched no rows, falling back to all rows"
        );
        selected = rows.iter().collect();
    }

    let Some(resolved) =
        policy.resolve(request.feature_key, request.outcome_key, selected.first().copied())
    else {
        debug!("no feature key could be resolved, CDF is empty");
        return BuiltCdf::empty(request.month, month_fallback);
    };

    let values: Vec<f64> = selected
        .iter()
        .filter_map(|r| r.numeric(&resolved.key))
        .collect();
    let dropped = selected.len() - values.len();
    let cdf = cdf_from_values(values);

    debug!(
        key = %resolved.key,
        source = ?resolved.source,
        points = cdf.len(),
        dropped,
        "built CDF"
    );

    BuiltCdf {
        feature_key: Some(resolved.key),
        key_source: Some(resolved.source),
        month: request.month,
        month_fallback,
        dropped,
        cdf,
    }
}

/// Build a CDF directly from values, dropping non-finite ones.
pub fn cdf_from_values(values: impl IntoIterator<Item = f64>) -> Cdf {
    let mut values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    values.sort_by(f64::total_cmp);
    Cdf::from_sorted_values(&values)
}
