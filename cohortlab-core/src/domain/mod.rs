//! Domain types: observation rows, CDF points, cutoff markers.

pub mod cdf;
pub mod marker;
pub mod observation;

pub use cdf::{Cdf, CdfPoint, CurveError};
pub use marker::{AxisType, CutoffPoint, MarkerId, MarkerPhase};
pub use observation::{ObservationRow, RowError, RowSchema};

/// Subject identifier type alias
pub type SubjectId = String;
