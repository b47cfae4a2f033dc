//! Interpretation of raw classifier output

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Binary credit risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    GoodRisk,
    BadRisk,
}

impl RiskLabel {
    /// Class index used by the classifier
    pub fn class_index(self) -> i64 {
        match self {
            RiskLabel::GoodRisk => 0,
            RiskLabel::BadRisk => 1,
        }
    }

    /// Value written to scored datasets, matching the German Credit `Risk` column
    pub fn as_dataset_value(self) -> &'static str {
        match self {
            RiskLabel::GoodRisk => "good",
            RiskLabel::BadRisk => "bad",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::GoodRisk => write!(f, "Good Risk"),
            RiskLabel::BadRisk => write!(f, "Bad Risk"),
        }
    }
}

impl TryFrom<i64> for RiskLabel {
    type Error = PipelineError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(RiskLabel::GoodRisk),
            1 => Ok(RiskLabel::BadRisk),
            other => Err(PipelineError::InvalidLabel(other)),
        }
    }
}

/// Outcome of one prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: RiskLabel,
    /// Probability the model assigned to `label`
    pub confidence: f64,
}

/// Map the classifier's raw class index and probability row to a result.
///
/// The confidence is the probability of the predicted class, not of the
/// bad-risk class.
pub fn interpret_prediction(
    raw_label: i64,
    probabilities: &[f64],
) -> Result<PredictionResult, PipelineError> {
    let label = RiskLabel::try_from(raw_label)?;
    let index = label.class_index() as usize;

    let confidence = *probabilities.get(index).ok_or_else(|| {
        PipelineError::InvalidProbabilities(format!(
            "row has {} entries, no probability for class {}",
            probabilities.len(),
            raw_label
        ))
    })?;

    if !(0.0..=1.0).contains(&confidence) {
        return Err(PipelineError::InvalidProbabilities(format!(
            "probability {} for class {} is outside [0, 1]",
            confidence, raw_label
        )));
    }

    Ok(PredictionResult { label, confidence })
}
