//! Interactive cutoff session: the single owner of editor state.
//!
//! The session holds the rows, the built CDF, the marker set and the two
//! baselines (seeded and last confirmed). The curve, constraint and
//! partition modules stay pure functions over snapshots of this state.
//!
//! Operations come in two cost tiers:
//!
//! - **preview** (`drag`, `preview`): constrain the move, interpolate the
//!   marker values, re-segment the curve. Run per pointer-move.
//! - **commit** (`release`, `confirm`, `select_month`, discrete edits):
//!   additionally re-resolve subjects and recompute the group table.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::curve::{build_cdf, segment_curve, BuiltCdf, CdfRequest, CurveSegment};
use crate::cutoff::{is_dirty, CutoffSeed, EditError, MarkerSet, MarkerSnapshot};
use crate::data::{
    resolve_subject_values, ConfirmationRequest, ConfirmationResponse, ConfirmationSink,
    FeatureRows, FeatureSource, SourceError, SubjectValue,
};
use crate::domain::{Cdf, CutoffPoint, MarkerId, MarkerPhase};
use crate::groups::{partition, GroupTable};

/// Cheap-tier view of the editor: marker coordinates and curve segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    /// Markers sorted by percentile, with interpolated values.
    pub markers: Vec<CutoffPoint>,
    pub segments: Vec<CurveSegment>,
    pub dirty: bool,
}

/// Editor state for one feature of one cohort.
#[derive(Debug, Clone)]
pub struct CutoffSession {
    config: EditorConfig,
    data: FeatureRows,
    requested_key: Option<String>,
    month: Option<i64>,
    built: BuiltCdf,
    markers: MarkerSet,
    seeded: MarkerSnapshot,
    confirmed: MarkerSnapshot,
    phase: MarkerPhase,
    groups: GroupTable,
}

impl CutoffSession {
    /// Start a session: build the curve, seed markers, compute groups.
    pub fn new(
        data: FeatureRows,
        feature_key: Option<String>,
        month: Option<i64>,
        config: EditorConfig,
    ) -> Self {
        let built = Self::build(&data, feature_key.as_deref(), month, &config);
        let markers = MarkerSet::seeded(&data.seed, &built.cdf, config.markers.clone());
        let seeded = markers.snapshot();

        let mut session = Self {
            config,
            data,
            requested_key: feature_key,
            month,
            built,
            markers,
            confirmed: seeded.clone(),
            seeded,
            phase: MarkerPhase::Seeded,
            groups: GroupTable::default(),
        };
        session.recompute_groups();
        session
    }

    /// Fetch rows from `source` and start a session on them.
    pub fn from_source(
        source: &dyn FeatureSource,
        task_id: &str,
        subgroup_id: &str,
        feature_key: Option<String>,
        month: Option<i64>,
        config: EditorConfig,
    ) -> Result<Self, SourceError> {
        let data = source.fetch_feature_rows(task_id, subgroup_id, month)?;
        Ok(Self::new(data, feature_key, month, config))
    }

    fn build(
        data: &FeatureRows,
        feature_key: Option<&str>,
        month: Option<i64>,
        config: &EditorConfig,
    ) -> BuiltCdf {
        let request = CdfRequest {
            feature_key,
            outcome_key: data.outcome_key.as_deref(),
            month,
        };
        build_cdf(&data.rows, &request, &config.rows.key_policy())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn data(&self) -> &FeatureRows {
        &self.data
    }

    pub fn built(&self) -> &BuiltCdf {
        &self.built
    }

    pub fn cdf(&self) -> &Cdf {
        &self.built.cdf
    }

    /// The feature actually plotted (explicit or resolved by policy).
    pub fn feature_key(&self) -> Option<&str> {
        self.built.feature_key.as_deref()
    }

    pub fn month(&self) -> Option<i64> {
        self.month
    }

    pub fn month_range(&self) -> Option<(i64, i64)> {
        self.data.month_range()
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn phase(&self) -> MarkerPhase {
        self.phase
    }

    /// Group table as of the last commit-tier operation.
    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }

    pub fn has_data(&self) -> bool {
        self.built.has_data()
    }

    pub fn is_dirty(&self) -> bool {
        is_dirty(&self.markers.snapshot(), &self.confirmed)
    }

    pub fn cutoff_points(&self) -> Vec<CutoffPoint> {
        self.markers.cutoff_points(&self.built.cdf)
    }

    /// One resolved value per subject at the selected month.
    pub fn subject_values(&self) -> Vec<SubjectValue> {
        match self.feature_key() {
            Some(key) => resolve_subject_values(&self.data.rows, key, self.month),
            None => Vec::new(),
        }
    }

    // ── Preview tier ─────────────────────────────────────────────────

    pub fn preview(&self) -> Preview {
        let markers = self.cutoff_points();
        let cuts: Vec<f64> = markers.iter().map(|c| c.value).collect();
        Preview {
            segments: segment_curve(self.built.cdf.points(), &cuts),
            markers,
            dirty: self.is_dirty(),
        }
    }

    /// Pointer-move on a marker. Groups are not recomputed until
    /// [`CutoffSession::release`]. `None` for an unknown marker.
    pub fn drag(&mut self, id: MarkerId, proposed: f64) -> Option<Preview> {
        self.markers.move_marker(id, proposed)?;
        self.phase = MarkerPhase::Interacting;
        Some(self.preview())
    }

    // ── Commit tier ──────────────────────────────────────────────────

    /// Pointer released: settle and recompute groups.
    pub fn release(&mut self) -> &GroupTable {
        if self.phase == MarkerPhase::Interacting {
            self.phase = MarkerPhase::Settled;
        }
        self.recompute_groups();
        &self.groups
    }

    /// Add a marker at `percent`; declined additions return `None`.
    pub fn add_marker(&mut self, percent: f64) -> Option<MarkerId> {
        let id = self.markers.add_marker(percent)?;
        self.phase = MarkerPhase::Settled;
        self.recompute_groups();
        Some(id)
    }

    /// Manual percentile entry. On rejection the marker keeps its position.
    pub fn edit_percentile(&mut self, id: MarkerId, percent: f64) -> Result<f64, EditError> {
        let applied = match self.markers.set_percentile(id, percent) {
            Ok(applied) => applied,
            Err(err) => {
                warn!(%id, percent, %err, "percentile edit rejected");
                return Err(err);
            }
        };
        self.phase = MarkerPhase::Settled;
        self.recompute_groups();
        Ok(applied)
    }

    /// Manual raw-value entry. On rejection the marker keeps its position.
    pub fn edit_value(&mut self, id: MarkerId, value: f64) -> Result<f64, EditError> {
        let applied = match self.markers.set_value(id, value, &self.built.cdf) {
            Ok(applied) => applied,
            Err(err) => {
                warn!(%id, value, %err, "value edit rejected");
                return Err(err);
            }
        };
        self.phase = MarkerPhase::Settled;
        self.recompute_groups();
        Ok(applied)
    }

    /// Replace every marker with externally supplied cutoffs, thinned and
    /// capped the same way as seeding. The seeded baseline is unchanged.
    pub fn apply_cutoffs(&mut self, cutoffs: &CutoffSeed) {
        self.markers = MarkerSet::seeded(cutoffs, &self.built.cdf, self.config.markers.clone());
        self.phase = MarkerPhase::Settled;
        self.recompute_groups();
    }

    /// Switch time bucket: rebuild the curve, keep marker percentiles.
    pub fn select_month(&mut self, month: Option<i64>) {
        if month == self.month {
            return;
        }
        self.month = month;
        self.built = Self::build(&self.data, self.requested_key.as_deref(), month, &self.config);
        info!(
            month = ?month,
            points = self.built.cdf.len(),
            fallback = self.built.month_fallback,
            "rebuilt curve for month"
        );
        self.recompute_groups();
    }

    /// Page-level reset: back to the seeded markers.
    pub fn reset(&mut self) {
        self.markers.restore(&self.seeded);
        self.confirmed = self.seeded.clone();
        self.phase = MarkerPhase::Seeded;
        self.recompute_groups();
    }

    /// Confirm the current markers: recompute groups, move the dirty
    /// baseline, and return the payload for the confirmation sink.
    pub fn confirm(&mut self) -> ConfirmationRequest {
        self.recompute_groups();
        self.mark_confirmed();
        self.confirmation_request()
    }

    /// Confirm through `sink`, adopting its group table. On error the
    /// session is left unconfirmed.
    pub fn confirm_with(
        &mut self,
        sink: &dyn ConfirmationSink,
    ) -> Result<ConfirmationResponse, SourceError> {
        let request = self.confirmation_request();
        let response = sink.confirm(&request)?;
        self.groups = response.groups.clone();
        self.mark_confirmed();
        Ok(response)
    }

    /// The payload [`CutoffSession::confirm`] would send, without confirming.
    pub fn confirmation_request(&self) -> ConfirmationRequest {
        ConfirmationRequest::from_cutoffs(self.month, self.data.axis_type, &self.cutoff_points())
    }

    fn mark_confirmed(&mut self) {
        self.confirmed = self.markers.snapshot();
        self.phase = MarkerPhase::Confirmed;
        info!(markers = ?self.markers.positions(), "cutoffs confirmed");
    }

    fn recompute_groups(&mut self) {
        let values: Vec<f64> = self.subject_values().iter().map(|s| s.value).collect();
        self.groups = partition(&values, &self.cutoff_points(), &self.config.groups);
        debug!(counts = ?self.groups.counts(), "recomputed groups");
    }
}
