//! Data adaptation: loading rows, per-subject resolution, external
//! source/sink interfaces, synthetic cohorts.

pub mod load;
pub mod resolve;
pub mod source;
pub mod synthetic;

pub use load::{load_rows, parse_csv, parse_json, LoadError};
pub use resolve::{resolve_subject_values, values_of, SubjectValue};
pub use source::{
    ConfirmationRequest, ConfirmationResponse, ConfirmationSink, FeatureRows, FeatureSource,
    FileSource, InMemorySource, LocalSink, SourceError,
};
pub use synthetic::{synthetic_cohort, SYNTHETIC_OUTCOME};
