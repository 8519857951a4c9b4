//! Curve segmenting: slice a CDF into contiguous coloured regions.
//!
//! For cutoffs `c1 < c2` the value axis splits into `[min, c1]`,
//! `[c1, c2]`, `[c2, max]`. Each segment starts and ends exactly on its
//! boundary (boundary points are synthesized by interpolation), so
//! adjacent segments share their boundary point with no gap or overlap.

use serde::{Deserialize, Serialize};

use super::interpolate::percent_for_value;
use crate::domain::CdfPoint;

/// One coloured slice of the curve, ready for an area chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment {
    /// Ordinal position, 0-based from the left.
    pub index: usize,
    /// Requested lower value bound, after clamping to the data range.
    pub start: f64,
    /// Requested upper value bound, after clamping to the data range.
    pub end: f64,
    /// Polyline; empty when the clamped range is inverted.
    pub points: Vec<CdfPoint>,
}

impl CurveSegment {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Split `cdf` at `cutoffs` (raw values) into `cutoffs.len() + 1` segments.
///
/// Non-finite cutoffs are ignored and the rest are sorted, so callers may
/// pass marker values in any order. An empty curve yields no segments.
pub fn segment_curve(cdf: &[CdfPoint], cutoffs: &[f64]) -> Vec<CurveSegment> {
    let (Some(first), Some(last)) = (cdf.first(), cdf.last()) else {
        return Vec::new();
    };
    let (min, max) = (first.value, last.value);

    let mut inner: Vec<f64> = cutoffs.iter().copied().filter(|c| c.is_finite()).collect();
    inner.sort_by(f64::total_cmp);

    let mut bounds = Vec::with_capacity(inner.len() + 2);
    bounds.push(min);
    bounds.extend(inner);
    bounds.push(max);

    bounds
        .windows(2)
        .enumerate()
        .map(|(index, w)| slice(cdf, index, w[0].clamp(min, max), w[1].clamp(min, max)))
        .collect()
}

fn slice(cdf: &[CdfPoint], index: usize, start: f64, end: f64) -> CurveSegment {
    if start > end {
        return CurveSegment {
            index,
            start,
            end,
            points: Vec::new(),
        };
    }

    let mut points = Vec::new();
    if let Some(p) = percent_for_value(cdf, start) {
        points.push(CdfPoint::new(start, p));
    }
    points.extend(cdf.iter().copied().filter(|pt| pt.value > start && pt.value < end));
    if let Some(p) = percent_for_value(cdf, end) {
        points.push(CdfPoint::new(end, p));
    }
    points.dedup();

    CurveSegment {
        index,
        start,
        end,
        points,
    }
}
