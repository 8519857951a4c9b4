//! Bidirectional CDF lookup: value ↔ cumulative percent.
//!
//! Both directions clamp to the curve's domain and interpolate linearly
//! between the bracketing points. Lookups are binary searches over the
//! monotone point sequence. They run on every drag event, so they stay
//! allocation-free and side-effect free.

use super::EPSILON;
use crate::domain::CdfPoint;

/// Value at cumulative percent `percent`.
///
/// `percent` is clamped to `[0, 100]` (NaN is treated as 0). At or below
/// the first point's percent the minimum value is returned, at or above
/// the last point's percent the maximum. Returns `None` only for an
/// empty curve.
pub fn value_for_percent(cdf: &[CdfPoint], percent: f64) -> Option<f64> {
    let first = cdf.first()?;
    let last = cdf.last()?;
    let p = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };

    if p <= first.percent {
        return Some(first.value);
    }
    if p >= last.percent {
        return Some(last.value);
    }

    // First point with percent >= p; 1 <= idx < len given the guards above.
    let idx = cdf.partition_point(|pt| pt.percent < p);
    let Some((lo, hi)) = bracket(cdf, idx) else {
        return Some(nearest(cdf, |pt| (pt.percent - p).abs()).value);
    };

    let dy = hi.percent - lo.percent;
    if dy.abs() < EPSILON {
        return Some(lo.value);
    }
    Some(lo.value + (p - lo.percent) / dy * (hi.value - lo.value))
}

/// Cumulative percent at raw value `value`.
///
/// `value` is clamped to the curve's value domain. Ties are resolved to
/// the first point carrying the value, so `percent_for_value` and
/// [`value_for_percent`] round-trip. Returns `None` only for an empty
/// curve or a NaN query.
pub fn percent_for_value(cdf: &[CdfPoint], value: f64) -> Option<f64> {
    let first = cdf.first()?;
    let last = cdf.last()?;
    if value.is_nan() {
        return None;
    }

    if value <= first.value {
        return Some(first.percent);
    }
    if value >= last.value {
        return Some(last.percent);
    }

    let idx = cdf.partition_point(|pt| pt.value < value);
    let Some((lo, hi)) = bracket(cdf, idx) else {
        return Some(nearest(cdf, |pt| (pt.value - value).abs()).percent);
    };

    let dx = hi.value - lo.value;
    if dx.abs() < EPSILON {
        return Some(lo.percent);
    }
    Some(lo.percent + (value - lo.value) / dx * (hi.percent - lo.percent))
}

fn bracket(cdf: &[CdfPoint], idx: usize) -> Option<(CdfPoint, CdfPoint)> {
    if idx == 0 || idx >= cdf.len() {
        return None;
    }
    Some((cdf[idx - 1], cdf[idx]))
}

fn nearest(cdf: &[CdfPoint], distance: impl Fn(&CdfPoint) -> f64) -> CdfPoint {
    cdf.iter()
        .copied()
        .min_by(|a, b| distance(a).total_cmp(&distance(b)))
        .unwrap_or(cdf[0])
}
