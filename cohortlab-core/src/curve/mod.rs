//! Curve math: CDF construction, bidirectional interpolation, segmenting.

pub mod builder;
pub mod interpolate;
pub mod segment;

pub use builder::{build_cdf, cdf_from_values, BuiltCdf, CdfRequest};
pub use interpolate::{percent_for_value, value_for_percent};
pub use segment::{segment_curve, CurveSegment};

/// Denominator guard for interpolation over flat or vertical spans.
pub const EPSILON: f64 = 1e-12;
