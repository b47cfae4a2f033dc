//! Error types for the feature pipeline.
//!
//! Every variant is terminal for the prediction that raised it. None of them
//! is retried: each one points at a data or artifact mismatch.

use thiserror::Error;

/// Errors that can occur while turning an applicant into a prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// A categorical value is outside the encoder's trained vocabulary.
    #[error("Unknown category '{label}' for {field}. Expected one of: {}", .vocabulary.join(", "))]
    UnknownCategory {
        /// Name of the encoder (categorical field)
        field: String,
        /// The label that was not found
        label: String,
        /// The encoder's full vocabulary, in code order
        vocabulary: Vec<String>,
    },

    /// A code passed to `decode` does not correspond to any class.
    #[error("Unknown code {code} for {field}: encoder has {size} classes")]
    UnknownCode {
        field: String,
        code: i64,
        size: usize,
    },

    /// The scaler was fed input of the wrong shape.
    #[error("Scaling failed: {0}")]
    Scaling(String),

    /// The column order requests a column the assembled row does not have.
    #[error("Missing feature '{column}': not produced by the feature pipeline")]
    MissingFeature { column: String },

    /// The classifier returned a class index outside {0, 1}.
    #[error("Invalid label {0}: expected 0 (good risk) or 1 (bad risk)")]
    InvalidLabel(i64),

    /// The classifier's probability row cannot back a prediction.
    #[error("Invalid probability row: {0}")]
    InvalidProbabilities(String),

    /// An applicant field is outside its allowed range.
    #[error("Invalid applicant record: {0}")]
    InvalidRecord(String),

    /// An artifact is internally inconsistent or disagrees with another one.
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_lists_vocabulary() {
        let err = PipelineError::UnknownCategory {
            field: "purpose".to_string(),
            label: "spaceship".to_string(),
            vocabulary: vec!["business".to_string(), "car".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown category 'spaceship' for purpose. Expected one of: business, car"
        );
    }

    #[test]
    fn test_invalid_label_display() {
        let err = PipelineError::InvalidLabel(2);
        assert!(err.to_string().contains("Invalid label 2"));
    }

    #[test]
    fn test_missing_feature_display() {
        let err = PipelineError::MissingFeature {
            column: "Job".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing feature 'Job': not produced by the feature pipeline"
        );
    }
}
