//! Pipeline module - from raw applicant values to a risk prediction

pub mod artifacts;
pub mod classifier;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod features;
pub mod prediction;
pub mod record;
pub mod scaler;
pub mod target;

pub use artifacts::*;
pub use classifier::*;
pub use dataset::*;
pub use encoder::*;
pub use error::*;
pub use features::*;
pub use prediction::*;
pub use record::*;
pub use scaler::*;
pub use target::*;
