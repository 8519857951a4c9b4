//! End-to-end editor scenarios through `CutoffSession`.

use serde_json::json;

use cohortlab_core::cutoff::EditError;
use cohortlab_core::data::{
    ConfirmationRequest, ConfirmationResponse, ConfirmationSink, FeatureRows, InMemorySource,
    LocalSink, SourceError,
};
use cohortlab_core::domain::{CdfPoint, MarkerPhase};
use cohortlab_core::feature::KeySource;
use cohortlab_core::groups::ALL_LABEL;
use cohortlab_core::{CutoffSeed, CutoffSession, EditorConfig, MarkerId, ObservationRow};

// ── Fixtures ─────────────────────────────────────────────────────────

/// Four subjects at month 6 with values 1..=4.
fn quartile_rows() -> Vec<ObservationRow> {
    (1..=4)
        .map(|i| ObservationRow::new(format!("S{i}"), Some(6)).with("v", json!(i as f64)))
        .collect()
}

fn quartile_data(seed: CutoffSeed) -> FeatureRows {
    FeatureRows {
        seed,
        ..FeatureRows::new(quartile_rows())
    }
}

fn session(seed: CutoffSeed) -> CutoffSession {
    CutoffSession::new(
        quartile_data(seed),
        Some("v".into()),
        Some(6),
        EditorConfig::default(),
    )
}

struct RejectingSink;

impl ConfirmationSink for RejectingSink {
    fn confirm(&self, _request: &ConfirmationRequest) -> Result<ConfirmationResponse, SourceError> {
        Err(SourceError::Rejected("service unavailable".into()))
    }
}

// ── Curve ────────────────────────────────────────────────────────────

#[test]
fn quartile_curve_and_lookups() {
    let s = session(CutoffSeed::percents(&[50.0]));
    assert_eq!(
        s.cdf().points(),
        &[
            CdfPoint::new(1.0, 25.0),
            CdfPoint::new(2.0, 50.0),
            CdfPoint::new(3.0, 75.0),
            CdfPoint::new(4.0, 100.0),
        ]
    );
    assert_eq!(s.cdf().value_for_percent(50.0), Some(2.0));
    assert_eq!(s.cdf().percent_for_value(3.0), Some(75.0));
    let v = s.cdf().value_for_percent(60.0).unwrap();
    assert!((v - 2.4).abs() < 1e-9);
}

#[test]
fn feature_key_falls_back_to_delta_column() {
    let rows = vec![
        ObservationRow::new("a", Some(0))
            .with("score", json!(20.0))
            .with("score_delta", json!(-1.0)),
        ObservationRow::new("b", Some(0))
            .with("score", json!(25.0))
            .with("score_delta", json!(2.0)),
    ];
    let s = CutoffSession::new(FeatureRows::new(rows), None, Some(0), EditorConfig::default());
    assert_eq!(s.feature_key(), Some("score_delta"));
    assert_eq!(s.built().key_source, Some(KeySource::DeltaMarker));
    assert_eq!(s.cdf().value_range(), Some((-1.0, 2.0)));
}

#[test]
fn empty_rows_give_no_curve_and_one_group() {
    let s = CutoffSession::new(FeatureRows::default(), None, None, EditorConfig::default());
    assert!(!s.has_data());
    assert!(s.cutoff_points().is_empty());
    assert!(s.preview().segments.is_empty());
    assert_eq!(s.groups().groups.len(), 1);
    assert_eq!(s.groups().groups[0].count, 0);
    assert_eq!(s.groups().groups[0].value_label, ALL_LABEL);
}

// ── Seeding ──────────────────────────────────────────────────────────

#[test]
fn raw_value_seed_is_mapped_through_curve() {
    let s = session(CutoffSeed::values(&[2.0]));
    assert_eq!(s.markers().positions(), &[50.0]);
    assert_eq!(s.groups().counts(), vec![2, 2]);
}

#[test]
fn unusable_seed_defaults_to_median() {
    let seed = CutoffSeed {
        cutoffs: vec![json!("NA"), json!(null)],
        ..CutoffSeed::percents(&[])
    };
    let s = session(seed);
    assert_eq!(s.markers().positions(), &[50.0]);
}

// ── Dragging ─────────────────────────────────────────────────────────

#[test]
fn drag_snaps_next_to_neighbour() {
    let mut s = session(CutoffSeed::percents(&[30.0, 32.0]));
    assert_eq!(s.markers().positions(), &[30.0, 32.0]);

    let preview = s.drag(MarkerId(1), 29.0).unwrap();
    assert_eq!(s.markers().positions(), &[30.0, 31.0]);
    let percents: Vec<f64> = preview.markers.iter().map(|m| m.percent).collect();
    assert_eq!(percents, vec![30.0, 31.0]);
    assert_eq!(preview.segments.len(), 3);
}

#[test]
fn boxed_in_marker_stays_put() {
    let mut s = session(CutoffSeed::percents(&[30.0, 31.0]));
    s.drag(MarkerId::PRIMARY, 45.0);
    assert_eq!(s.markers().positions(), &[30.0, 31.0]);
}

#[test]
fn release_recomputes_groups() {
    let mut s = session(CutoffSeed::percents(&[50.0]));
    s.drag(MarkerId::PRIMARY, 75.0);
    assert_eq!(s.groups().counts(), vec![2, 2]);
    let counts = s.release().counts();
    assert_eq!(counts, vec![3, 1]);
    assert_eq!(s.phase(), MarkerPhase::Settled);
}

// ── Discrete Edits ───────────────────────────────────────────────────

#[test]
fn add_marker_respects_limit_and_proximity() {
    let mut s = session(CutoffSeed::percents(&[50.0]));
    assert_eq!(s.add_marker(52.0), None);
    assert_eq!(s.add_marker(80.0), Some(MarkerId(1)));
    assert_eq!(s.add_marker(20.0), None);
    assert_eq!(s.groups().counts(), vec![2, 1, 1]);
}

#[test]
fn manual_edits_validate_and_keep_position_on_reject() {
    let mut s = session(CutoffSeed::percents(&[30.0, 70.0]));

    assert_eq!(
        s.edit_percentile(MarkerId::PRIMARY, 70.5),
        Err(EditError::Overlap {
            id: MarkerId::PRIMARY,
            position: 70.5
        })
    );
    assert_eq!(s.edit_percentile(MarkerId(1), 120.0), Err(EditError::OutOfRange(120.0)));
    assert_eq!(s.edit_percentile(MarkerId(5), 10.0), Err(EditError::UnknownMarker(MarkerId(5))));
    assert_eq!(s.markers().positions(), &[30.0, 70.0]);

    assert_eq!(s.edit_value(MarkerId(1), 3.0), Ok(75.0));
    assert_eq!(s.edit_percentile(MarkerId::PRIMARY, 42.5), Ok(42.5));
    assert_eq!(s.markers().positions(), &[42.5, 75.0]);
}

#[test]
fn apply_cutoffs_replaces_markers() {
    let mut s = session(CutoffSeed::percents(&[50.0]));
    s.apply_cutoffs(&CutoffSeed::values(&[1.5, 3.5]));
    assert_eq!(s.markers().positions(), &[37.5, 87.5]);
    assert_eq!(s.groups().counts(), vec![1, 2, 1]);
    assert!(s.is_dirty());
}

// ── Dirty / Confirm / Reset ──────────────────────────────────────────

#[test]
fn dirty_tracks_last_confirmation() {
    let mut s = session(CutoffSeed::percents(&[50.0]));
    assert!(!s.is_dirty());

    s.drag(MarkerId::PRIMARY, 60.0);
    assert!(s.is_dirty());

    let request = s.confirm();
    assert!(!s.is_dirty());
    assert_eq!(request.cutoff_x, vec!["2.40"]);
    assert_eq!(request.cutoff_y, vec!["60.00%"]);

    s.drag(MarkerId::PRIMARY, 50.0);
    assert!(s.is_dirty());
    s.drag(MarkerId::PRIMARY, 60.0);
    assert!(!s.is_dirty());
}

#[test]
fn reset_restores_seeded_markers() {
    let mut s = session(CutoffSeed::percents(&[50.0]));
    s.add_marker(80.0);
    s.drag(MarkerId::PRIMARY, 20.0);
    s.confirm();

    s.reset();
    assert_eq!(s.markers().positions(), &[50.0]);
    assert_eq!(s.phase(), MarkerPhase::Seeded);
    assert!(!s.is_dirty());
    assert_eq!(s.groups().counts(), vec![2, 2]);
}

#[test]
fn confirm_with_local_sink_adopts_groups() {
    let mut s = session(CutoffSeed::percents(&[50.0]));
    s.drag(MarkerId::PRIMARY, 60.0);
    s.release();

    let sink = LocalSink::new(quartile_rows(), "v", s.config().groups.clone());
    let response = s.confirm_with(&sink).unwrap();

    assert!(!response.authoritative);
    assert_eq!(response.groups.counts(), vec![2, 2]);
    assert_eq!(response.groups.groups[0].value_label, "X<=2.40");
    assert_eq!(response.groups.groups[1].percent_label, "X>60.00%");
    assert_eq!(s.groups(), &response.groups);
    assert_eq!(s.phase(), MarkerPhase::Confirmed);
    assert!(!s.is_dirty());
}

#[test]
fn failed_confirmation_leaves_session_dirty() {
    let mut s = session(CutoffSeed::percents(&[50.0]));
    s.drag(MarkerId::PRIMARY, 60.0);
    s.release();

    let err = s.confirm_with(&RejectingSink).unwrap_err();
    assert!(matches!(err, SourceError::Rejected(_)));
    assert!(s.is_dirty());
    assert_eq!(s.phase(), MarkerPhase::Settled);
}

// ── Month Selection ──────────────────────────────────────────────────

#[test]
fn select_month_rebuilds_curve_with_fallback() {
    let mut rows = quartile_rows();
    rows.push(ObservationRow::new("S1", Some(12)).with("v", json!(10.0)));
    rows.push(ObservationRow::new("S2", Some(12)).with("v", json!(20.0)));
    let mut s = CutoffSession::new(
        FeatureRows::new(rows),
        Some("v".into()),
        Some(6),
        EditorConfig::default(),
    );
    assert_eq!(s.cdf().len(), 4);

    s.select_month(Some(12));
    assert_eq!(s.month(), Some(12));
    assert_eq!(s.cdf().len(), 2);
    assert!(!s.built().month_fallback);
    assert_eq!(s.markers().positions(), &[50.0]);

    s.select_month(Some(99));
    assert!(s.built().month_fallback);
    assert_eq!(s.cdf().len(), 6);
    assert_eq!(s.groups().total, 4);
    assert_eq!(s.month_range(), Some((6, 12)));
}

// ── Sources ──────────────────────────────────────────────────────────

#[test]
fn session_from_in_memory_source() {
    let mut source = InMemorySource::new();
    source.insert("task-1", "all", quartile_data(CutoffSeed::percents(&[25.0, 75.0])));

    let s = CutoffSession::from_source(
        &source,
        "task-1",
        "all",
        Some("v".into()),
        Some(6),
        EditorConfig::default(),
    )
    .unwrap();
    assert_eq!(s.markers().positions(), &[25.0, 75.0]);
    assert_eq!(s.groups().counts(), vec![1, 2, 1]);

    let missing = CutoffSession::from_source(
        &source,
        "task-2",
        "all",
        None,
        None,
        EditorConfig::default(),
    );
    assert!(matches!(missing, Err(SourceError::NotFound { .. })));
}
