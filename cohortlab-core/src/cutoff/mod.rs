//! Cutoff markers: constrained moves, marker set editing, dirty tracking.

pub mod constraint;
pub mod dirty;
pub mod markers;

pub use constraint::{constrain_move, fits_between, DEFAULT_MIN_GAP};
pub use dirty::{is_dirty, MarkerSnapshot};
pub use markers::{CutoffSeed, EditError, MarkerSet};
