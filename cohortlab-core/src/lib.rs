//! CohortLab Core: the cutoff-curve engine behind the response dashboard.
//!
//! This crate turns per-subject, per-month observations into an empirical
//! CDF and lets a user place 1–N ordered cutoff markers on it:
//! - Tolerant numeric coercion of observation cells
//! - CDF construction with a documented feature-key fallback policy
//! - Bidirectional value ↔ percent interpolation
//! - Curve segmenting for coloured area rendering
//! - Non-crossing marker constraint, add/edit/reset, dirty tracking
//! - Ordinal group partitioning with value and percentile labels
//! - A session object separating per-move previews from commits
//!
//! Everything is synchronous and pure over in-memory data; fetching rows
//! and posting confirmations go through the traits in [`data::source`].

pub mod coerce;
pub mod config;
pub mod curve;
pub mod cutoff;
pub mod data;
pub mod domain;
pub mod feature;
pub mod groups;
pub mod session;

pub use config::{ConfigError, EditorConfig};
pub use curve::{build_cdf, percent_for_value, segment_curve, value_for_percent, BuiltCdf, CdfRequest};
pub use cutoff::{constrain_move, CutoffSeed, EditError, MarkerSet};
pub use domain::{AxisType, Cdf, CdfPoint, CutoffPoint, MarkerId, ObservationRow};
pub use groups::{partition, GroupSummary, GroupTable};
pub use session::{CutoffSession, Preview};
