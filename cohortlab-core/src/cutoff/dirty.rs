//! Dirty-state tracking for the "generate" affordance.
//!
//! Positions compare at two-decimal precision, so sub-hundredth drift
//! from interpolation never flags the editor as dirty.

use serde::{Deserialize, Serialize};

/// Marker positions captured at a point in time (seed or last confirm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    pub primary: f64,
    pub additional: Vec<f64>,
}

impl MarkerSnapshot {
    pub fn new(primary: f64, additional: Vec<f64>) -> Self {
        Self { primary, additional }
    }
}

/// True if `current` differs from `baseline` in the primary position, the
/// number of additional markers, or any additional position (pairwise).
pub fn is_dirty(current: &MarkerSnapshot, baseline: &MarkerSnapshot) -> bool {
    round2(current.primary) != round2(baseline.primary)
        || current.additional.len() != baseline.additional.len()
        || current
            .additional
            .iter()
            .zip(&baseline.additional)
            .any(|(a, b)| round2(*a) != round2(*b))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_is_clean() {
        let a = MarkerSnapshot::new(30.0, vec![60.0]);
        assert!(!is_dirty(&a, &a.clone()));
    }

    #[test]
    fn sub_hundredth_drift_is_clean() {
        let a = MarkerSnapshot::new(30.001, vec![60.004]);
        let b = MarkerSnapshot::new(30.0, vec![60.0]);
        assert!(!is_dirty(&a, &b));
    }

    #[test]
    fn primary_move_is_dirty() {
        let a = MarkerSnapshot::new(31.0, vec![]);
        let b = MarkerSnapshot::new(30.0, vec![]);
        assert!(is_dirty(&a, &b));
    }

    #[test]
    fn added_marker_is_dirty() {
        let a = MarkerSnapshot::new(30.0, vec![60.0]);
        let b = MarkerSnapshot::new(30.0, vec![]);
        assert!(is_dirty(&a, &b));
    }

    #[test]
    fn additional_move_is_dirty() {
        let a = MarkerSnapshot::new(30.0, vec![61.0]);
        let b = MarkerSnapshot::new(30.0, vec![60.0]);
        assert!(is_dirty(&a, &b));
    }
}
