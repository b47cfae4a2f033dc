//! credrisk: Credit Risk Scoring Library
//!
//! Turns loan applicant records into model-ready feature vectors using
//! pre-trained encoders, a scaler and a fixed column order, and interprets
//! the classifier's output as a good/bad risk prediction.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
