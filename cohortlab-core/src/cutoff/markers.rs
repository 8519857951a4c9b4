//! The marker set: one primary marker plus a bounded number of additional
//! markers, all positioned by percentile.
//!
//! Raw values are never stored; they are interpolated from the current CDF
//! on demand, so positions stay valid when the curve is rebuilt for another
//! month. Every mutation keeps markers strictly ordered by percentile,
//! which (the CDF being monotone) also keeps them ordered by value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::constraint::{constrain_move, fits_between};
use super::dirty::MarkerSnapshot;
use crate::coerce::coerce_value;
use crate::config::MarkersConfig;
use crate::domain::{AxisType, Cdf, CutoffPoint, MarkerId};

/// Percentile used for the primary marker when nothing usable is seeded.
pub const DEFAULT_PRIMARY_PERCENT: f64 = 50.0;

/// Rejected manual edit. The marker set is left unchanged.
#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("unknown {0}")]
    UnknownMarker(MarkerId),

    #[error("percentile {0} is outside [0, 100]")]
    OutOfRange(f64),

    #[error("{0} is not a finite number")]
    NotFinite(f64),

    #[error("{id} at {position} would overlap or cross a neighbouring marker")]
    Overlap { id: MarkerId, position: f64 },

    #[error("no data to map value {0} onto a percentile")]
    NoData(f64),
}

/// Externally supplied cutoffs used to seed the markers on data load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutoffSeed {
    pub axis_type: AxisType,
    /// Raw values or percentiles depending on `axis_type`; strings such
    /// as `"30%"` are accepted.
    pub cutoffs: Vec<Value>,
}

impl CutoffSeed {
    pub fn percents(values: &[f64]) -> Self {
        Self {
            axis_type: AxisType::YPercent,
            cutoffs: values.iter().map(|&v| Value::from(v)).collect(),
        }
    }

    pub fn values(values: &[f64]) -> Self {
        Self {
            axis_type: AxisType::XValue,
            cutoffs: values.iter().map(|&v| Value::from(v)).collect(),
        }
    }
}

/// Ordered cutoff markers. Index 0 is the primary marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSet {
    positions: Vec<f64>,
    limits: MarkersConfig,
}

impl MarkerSet {
    /// A set with only the primary marker at `primary` (clamped to `[0, 100]`).
    pub fn new(primary: f64, limits: MarkersConfig) -> Self {
        let primary = if primary.is_finite() {
            primary.clamp(0.0, 100.0)
        } else {
            DEFAULT_PRIMARY_PERCENT
        };
        Self {
            positions: vec![primary],
            limits,
        }
    }

    /// Seed markers from externally supplied cutoffs.
    ///
    /// Raw-value seeds are mapped through `cdf`; unusable seeds are dropped.
    /// Survivors are sorted, thinned to respect the minimum gap, and capped
    /// at `1 + max_additional`. With nothing usable the primary marker sits
    /// at the median.
    pub fn seeded(seed: &CutoffSeed, cdf: &Cdf, limits: MarkersConfig) -> Self {
        let mut percents: Vec<f64> = seed
            .cutoffs
            .iter()
            .filter_map(coerce_value)
            .filter_map(|v| match seed.axis_type {
                AxisType::YPercent => Some(v.clamp(0.0, 100.0)),
                AxisType::XValue => cdf.percent_for_value(v),
            })
            .collect();
        percents.sort_by(f64::total_cmp);

        let capacity = 1 + limits.max_additional;
        let mut accepted: Vec<f64> = Vec::with_capacity(capacity);
        for p in percents {
            if accepted.len() == capacity {
                break;
            }
            match accepted.last() {
                Some(&prev) if p - prev < limits.min_gap_percent => continue,
                _ => accepted.push(p),
            }
        }

        if accepted.is_empty() {
            debug!(seeds = seed.cutoffs.len(), "no usable seed cutoffs, using median");
            accepted.push(DEFAULT_PRIMARY_PERCENT);
        }

        Self {
            positions: accepted,
            limits,
        }
    }

    pub fn limits(&self) -> &MarkersConfig {
        &self.limits
    }

    /// Positions in marker order (primary first).
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn primary(&self) -> f64 {
        self.positions[0]
    }

    pub fn additional(&self) -> &[f64] {
        &self.positions[1..]
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, id: MarkerId) -> Option<f64> {
        self.positions.get(id.0).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = MarkerId> {
        (0..self.positions.len()).map(MarkerId)
    }

    /// True if another marker may still be added.
    pub fn can_add(&self) -> bool {
        self.additional().len() < self.limits.max_additional
    }

    fn others(&self, id: MarkerId) -> Vec<f64> {
        self.positions
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id.0)
            .map(|(_, &p)| p)
            .collect()
    }

    /// Drag a marker. The proposal is constrained so markers never meet or
    /// cross; returns the applied position, or `None` for an unknown id.
    pub fn move_marker(&mut self, id: MarkerId, proposed: f64) -> Option<f64> {
        let current = self.get(id)?;
        let next = constrain_move(
            proposed,
            current,
            &self.others(id),
            self.limits.min_gap_percent,
        );
        self.positions[id.0] = next;
        Some(next)
    }

    /// Add a marker at `percent`.
    ///
    /// Declines (returns `None`) when the limit is reached, the position is
    /// not a finite percentile, or another marker lies within the
    /// add-proximity threshold.
    pub fn add_marker(&mut self, percent: f64) -> Option<MarkerId> {
        if !self.can_add() {
            debug!(limit = self.limits.max_additional, "add declined: marker limit reached");
            return None;
        }
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            debug!(percent, "add declined: position out of range");
            return None;
        }
        let proximity = self.limits.add_proximity_percent;
        let gap = self.limits.min_gap_percent.max(proximity);
        if self.positions.iter().any(|&p| (p - percent).abs() < gap) {
            debug!(percent, proximity, "add declined: too close to an existing marker");
            return None;
        }
        self.positions.push(percent);
        Some(MarkerId(self.positions.len() - 1))
    }

    /// Manually set a marker's percentile.
    ///
    /// Unlike [`MarkerSet::move_marker`] nothing is snapped: an entry that
    /// is out of range or would meet or cross a neighbour is rejected and
    /// the previous position kept.
    pub fn set_percentile(&mut self, id: MarkerId, percent: f64) -> Result<f64, EditError> {
        let current = self.get(id).ok_or(EditError::UnknownMarker(id))?;
        if !percent.is_finite() {
            return Err(EditError::NotFinite(percent));
        }
        if !(0.0..=100.0).contains(&percent) {
            return Err(EditError::OutOfRange(percent));
        }
        if !fits_between(percent, current, &self.others(id), self.limits.min_gap_percent) {
            return Err(EditError::Overlap {
                id,
                position: percent,
            });
        }
        self.positions[id.0] = percent;
        Ok(percent)
    }

    /// Manually set a marker by raw value, mapped through `cdf`.
    pub fn set_value(&mut self, id: MarkerId, value: f64, cdf: &Cdf) -> Result<f64, EditError> {
        if self.get(id).is_none() {
            return Err(EditError::UnknownMarker(id));
        }
        if !value.is_finite() {
            return Err(EditError::NotFinite(value));
        }
        let percent = cdf.percent_for_value(value).ok_or(EditError::NoData(value))?;
        self.set_percentile(id, percent)
    }

    /// Both coordinates of every marker, sorted by percentile.
    ///
    /// Empty when the CDF has no data.
    pub fn cutoff_points(&self, cdf: &Cdf) -> Vec<CutoffPoint> {
        let mut points: Vec<CutoffPoint> = self
            .ids()
            .filter_map(|id| {
                let percent = self.positions[id.0];
                cdf.value_for_percent(percent)
                    .map(|value| CutoffPoint { id, percent, value })
            })
            .collect();
        points.sort_by(|a, b| a.percent.total_cmp(&b.percent));
        points
    }

    pub fn snapshot(&self) -> MarkerSnapshot {
        MarkerSnapshot::new(self.primary(), self.additional().to_vec())
    }

    /// Restore positions from a snapshot (page-level reset).
    pub fn restore(&mut self, snapshot: &MarkerSnapshot) {
        let mut positions = vec![snapshot.primary];
        positions.extend(
            snapshot
                .additional
                .iter()
                .take(self.limits.max_additional)
                .copied(),
        );
        self.positions = positions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::cdf_from_values;
    use serde_json::json;

    fn limits() -> MarkersConfig {
        MarkersConfig::default()
    }

    fn quartiles() -> Cdf {
        cdf_from_values(vec![1.0, 2.0, 3.0, 4.0])
    }

    #[test]
    fn seeds_from_percent_strings() {
        let seed = CutoffSeed {
            axis_type: AxisType::YPercent,
            cutoffs: vec![json!("60%"), json!("30")],
        };
        let set = MarkerSet::seeded(&seed, &quartiles(), limits());
        assert_eq!(set.positions(), &[30.0, 60.0]);
    }

    #[test]
    fn seeds_from_raw_values() {
        let set = MarkerSet::seeded(&CutoffSeed::values(&[2.4]), &quartiles(), limits());
        assert_eq!(set.len(), 1);
        assert!((set.primary() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn seeding_caps_marker_count() {
        let set = MarkerSet::seeded(
            &CutoffSeed::percents(&[10.0, 40.0, 70.0]),
            &quartiles(),
            limits(),
        );
        assert_eq!(set.positions(), &[10.0, 40.0]);
    }

    #[test]
    fn unusable_seed_falls_back_to_median() {
        let seed = CutoffSeed {
            axis_type: AxisType::YPercent,
            cutoffs: vec![json!("n/a")],
        };
        let set = MarkerSet::seeded(&seed, &quartiles(), limits());
        assert_eq!(set.positions(), &[DEFAULT_PRIMARY_PERCENT]);
    }

    #[test]
    fn value_seed_without_data_is_dropped() {
        let set = MarkerSet::seeded(&CutoffSeed::values(&[2.0]), &Cdf::empty(), limits());
        assert_eq!(set.positions(), &[DEFAULT_PRIMARY_PERCENT]);
    }

    #[test]
    fn add_respects_limit_and_proximity() {
        let mut set = MarkerSet::new(30.0, limits());
        assert_eq!(set.add_marker(33.0), None);
        assert_eq!(set.add_marker(f64::NAN), None);
        assert_eq!(set.add_marker(101.0), None);
        assert_eq!(set.add_marker(60.0), Some(MarkerId(1)));
        assert_eq!(set.add_marker(90.0), None);
        assert_eq!(set.positions(), &[30.0, 60.0]);
    }

    #[test]
    fn drag_snaps_next_to_neighbour() {
        let mut set = MarkerSet::new(30.0, limits());
        let id = set.add_marker(40.0).unwrap();
        set.move_marker(id, 32.0).unwrap();
        assert_eq!(set.move_marker(id, 29.0), Some(31.0));
        assert_eq!(set.positions(), &[30.0, 31.0]);
    }

    #[test]
    fn move_unknown_marker_is_none() {
        let mut set = MarkerSet::new(30.0, limits());
        assert_eq!(set.move_marker(MarkerId(3), 50.0), None);
    }

    #[test]
    fn manual_edit_rejections_leave_state_untouched() {
        let mut set = MarkerSet::new(30.0, limits());
        set.add_marker(60.0).unwrap();

        assert_eq!(set.set_percentile(MarkerId(0), 120.0), Err(EditError::OutOfRange(120.0)));
        assert_eq!(
            set.set_percentile(MarkerId(0), 60.0),
            Err(EditError::Overlap {
                id: MarkerId(0),
                position: 60.0
            })
        );
        assert!(matches!(
            set.set_percentile(MarkerId(0), 75.0),
            Err(EditError::Overlap { .. })
        ));
        assert_eq!(
            set.set_percentile(MarkerId(5), 10.0),
            Err(EditError::UnknownMarker(MarkerId(5)))
        );
        assert_eq!(set.positions(), &[30.0, 60.0]);

        assert_eq!(set.set_percentile(MarkerId(0), 45.5), Ok(45.5));
        assert_eq!(set.positions(), &[45.5, 60.0]);
    }

    #[test]
    fn value_edit_maps_through_cdf() {
        let mut set = MarkerSet::new(30.0, limits());
        let p = set.set_value(MarkerId(0), 3.0, &quartiles()).unwrap();
        assert_eq!(p, 75.0);
        assert_eq!(
            set.set_value(MarkerId(0), 3.0, &Cdf::empty()),
            Err(EditError::NoData(3.0))
        );
    }

    #[test]
    fn cutoff_points_sorted_with_values() {
        let mut set = MarkerSet::new(60.0, limits());
        set.add_marker(25.0).unwrap();
        let points = set.cutoff_points(&quartiles());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, MarkerId(1));
        assert_eq!(points[0].value, 1.0);
        assert!((points[1].value - 2.4).abs() < 1e-12);
        assert!(set.cutoff_points(&Cdf::empty()).is_empty());
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut set = MarkerSet::new(30.0, limits());
        let before = set.snapshot();
        set.add_marker(70.0).unwrap();
        set.move_marker(MarkerId(0), 20.0).unwrap();
        set.restore(&before);
        assert_eq!(set.positions(), &[30.0]);
    }
}
