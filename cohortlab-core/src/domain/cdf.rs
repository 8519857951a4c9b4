//! Empirical CDF: an ordered sequence of `(value, cumulative percent)` points.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One point on an empirical CDF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdfPoint {
    pub value: f64,
    /// Cumulative percent in `[0, 100]`.
    pub percent: f64,
}

impl CdfPoint {
    pub fn new(value: f64, percent: f64) -> Self {
        Self { value, percent }
    }
}

/// Errors for externally supplied CDF points.
#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("point {index} is not finite")]
    NonFinite { index: usize },

    #[error("point {index} has percent {percent} outside [0, 100]")]
    PercentOutOfRange { index: usize, percent: f64 },

    #[error("point {index} decreases in value or percent")]
    NotMonotone { index: usize },
}

/// A non-decreasing, immutable empirical CDF.
///
/// Rebuilt from scratch whenever the feature or time bucket changes,
/// never mutated in place. May be empty ("no usable data").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cdf {
    points: Vec<CdfPoint>,
}

impl Cdf {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from values already sorted ascending.
    ///
    /// The k-th smallest of N values maps to `100*k/N`, so the last
    /// point is exactly 100.
    pub(crate) fn from_sorted_values(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| CdfPoint::new(v, 100.0 * (i + 1) as f64 / n))
            .collect();
        Self { points }
    }

    /// Wrap externally supplied points after validating the CDF shape.
    pub fn from_points(points: Vec<CdfPoint>) -> Result<Self, CurveError> {
        for (index, p) in points.iter().enumerate() {
            if !p.value.is_finite() || !p.percent.is_finite() {
                return Err(CurveError::NonFinite { index });
            }
            if !(0.0..=100.0).contains(&p.percent) {
                return Err(CurveError::PercentOutOfRange {
                    index,
                    percent: p.percent,
                });
            }
            if index > 0 {
                let prev = points[index - 1];
                if p.value < prev.value || p.percent < prev.percent {
                    return Err(CurveError::NotMonotone { index });
                }
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[CdfPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&CdfPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&CdfPoint> {
        self.points.last()
    }

    /// `(min, max)` of the value axis, `None` when empty.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        Some((self.first()?.value, self.last()?.value))
    }

    pub fn value_for_percent(&self, percent: f64) -> Option<f64> {
        crate::curve::interpolate::value_for_percent(&self.points, percent)
    }

    pub fn percent_for_value(&self, value: f64) -> Option<f64> {
        crate::curve::interpolate::percent_for_value(&self.points, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_values_map_to_rank_percent() {
        let cdf = Cdf::from_sorted_values(&[1.0, 2.0, 3.0, 4.0]);
        let percents: Vec<f64> = cdf.points().iter().map(|p| p.percent).collect();
        assert_eq!(percents, vec![25.0, 50.0, 75.0, 100.0]);
        assert_eq!(cdf.value_range(), Some((1.0, 4.0)));
    }

    #[test]
    fn last_percent_is_exactly_100() {
        for n in 1..200 {
            let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let cdf = Cdf::from_sorted_values(&values);
            assert_eq!(cdf.last().unwrap().percent, 100.0, "n = {n}");
        }
    }

    #[test]
    fn from_points_rejects_decreasing_values() {
        let err = Cdf::from_points(vec![CdfPoint::new(2.0, 50.0), CdfPoint::new(1.0, 100.0)])
            .unwrap_err();
        assert_eq!(err, CurveError::NotMonotone { index: 1 });
    }

    #[test]
    fn from_points_rejects_bad_percent() {
        let err = Cdf::from_points(vec![CdfPoint::new(1.0, 120.0)]).unwrap_err();
        assert!(matches!(err, CurveError::PercentOutOfRange { index: 0, .. }));
    }

    #[test]
    fn from_points_rejects_nan() {
        let err = Cdf::from_points(vec![CdfPoint::new(f64::NAN, 10.0)]).unwrap_err();
        assert_eq!(err, CurveError::NonFinite { index: 0 });
    }

    #[test]
    fn empty_cdf_has_no_range() {
        assert!(Cdf::empty().is_empty());
        assert_eq!(Cdf::empty().value_range(), None);
    }
}
