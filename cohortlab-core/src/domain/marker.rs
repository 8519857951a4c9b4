//! Cutoff marker coordinates and identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How externally seeded cutoffs are expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisType {
    /// Raw feature values on the x axis.
    #[default]
    #[serde(rename = "x_value")]
    XValue,
    /// Cumulative percentiles on the y axis.
    #[serde(rename = "y_percent")]
    YPercent,
}

impl fmt::Display for AxisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisType::XValue => write!(f, "x_value"),
            AxisType::YPercent => write!(f, "y_percent"),
        }
    }
}

/// Marker handle. Index 0 is the primary marker, the rest are additional
/// markers in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub usize);

impl MarkerId {
    pub const PRIMARY: MarkerId = MarkerId(0);

    pub fn is_primary(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker#{}", self.0)
    }
}

/// Both coordinates of a cutoff: its percentile and the raw value
/// interpolated from the CDF at that percentile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutoffPoint {
    pub id: MarkerId,
    pub percent: f64,
    pub value: f64,
}

/// Interaction phase of the marker set.
///
/// Seeded → Interacting (dragging) → Settled (released) → Confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerPhase {
    Seeded,
    Interacting,
    Settled,
    Confirmed,
}
