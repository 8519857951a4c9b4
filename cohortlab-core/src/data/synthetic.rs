//! Synthetic cohorts for demos and benchmarks.
//!
//! Deterministic per cohort name: the RNG is seeded from a BLAKE3 hash of
//! the name, so the same name always yields the same rows. About one visit
//! in ten is skipped and one value in twenty is `"NA"`, so the per-subject
//! resolution and coercion paths get exercised.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use super::source::FeatureRows;
use crate::cutoff::CutoffSeed;
use crate::domain::{AxisType, ObservationRow};

/// Outcome column of synthetic rows.
pub const SYNTHETIC_OUTCOME: &str = "score";

/// Generate `subjects` subjects observed at each of `months`.
///
/// Fields: `score` (outcome) and `score_delta` (change from the first
/// month). Seeded at the 33rd and 66th percentiles.
pub fn synthetic_cohort(name: &str, subjects: usize, months: &[i64]) -> FeatureRows {
    let seed: [u8; 32] = *blake3::hash(name.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut rows = Vec::with_capacity(subjects * months.len());
    for s in 0..subjects {
        let subject = format!("S{:04}", s + 1);
        let baseline: f64 = rng.gen_range(10.0..40.0);
        let slope: f64 = rng.gen_range(-0.5..1.0);
        let first = months.first().copied().unwrap_or(0);

        for &month in months {
            if month != first && rng.gen_bool(0.1) {
                continue;
            }
            let delta = slope * (month - first) as f64 + rng.gen_range(-1.5..1.5);
            let score = baseline + delta;
            rows.push(
                ObservationRow::new(subject.clone(), Some(month))
                    .with(SYNTHETIC_OUTCOME, maybe_missing(&mut rng, score))
                    .with("score_delta", maybe_missing(&mut rng, delta)),
            );
        }
    }

    FeatureRows {
        rows,
        outcome_key: Some(SYNTHETIC_OUTCOME.to_string()),
        month_min: months.iter().copied().min(),
        month_max: months.iter().copied().max(),
        axis_type: AxisType::YPercent,
        seed: CutoffSeed::percents(&[33.0, 66.0]),
    }
}

fn maybe_missing(rng: &mut StdRng, value: f64) -> Value {
    if rng.gen_bool(0.05) {
        json!("NA")
    } else {
        json!((value * 100.0).round() / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_rows() {
        let a = synthetic_cohort("trial-a", 20, &[0, 6, 12]);
        let b = synthetic_cohort("trial-a", 20, &[0, 6, 12]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_names_differ() {
        let a = synthetic_cohort("trial-a", 20, &[0, 6, 12]);
        let b = synthetic_cohort("trial-b", 20, &[0, 6, 12]);
        assert_ne!(a.rows, b.rows);
    }

    #[test]
    fn every_subject_has_a_first_visit() {
        let cohort = synthetic_cohort("trial-a", 50, &[0, 6, 12]);
        let baseline = cohort.rows.iter().filter(|r| r.month == Some(0)).count();
        assert_eq!(baseline, 50);
        assert_eq!(cohort.month_range(), Some((0, 12)));
        assert!(cohort.rows.len() <= 150);
    }
}
