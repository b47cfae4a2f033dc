//! Report module - rendering predictions, importances and evaluations

pub mod importance;
pub mod inspect;
pub mod metrics;
pub mod prediction_report;
pub mod summary;

pub use importance::*;
pub use inspect::*;
pub use metrics::*;
pub use prediction_report::*;
pub use summary::*;
