//! Affine scaler over the numeric applicant fields

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::features::NUMERIC_COLUMNS;

/// Fitted scaler parameters, one entry per numeric input.
///
/// `Standard` computes `(x - mean) / scale`; `MinMax` computes `x * scale + min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    Standard {
        /// Names of the fitted inputs, if recorded at fit time
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        features: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMax {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        features: Vec<String>,
        min: Vec<f64>,
        scale: Vec<f64>,
    },
}

impl Scaler {
    /// Standard scaler without recorded feature names
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Scaler::Standard {
            features: Vec::new(),
            mean,
            scale,
        }
    }

    /// Min-max scaler without recorded feature names
    pub fn min_max(min: Vec<f64>, scale: Vec<f64>) -> Self {
        Scaler::MinMax {
            features: Vec::new(),
            min,
            scale,
        }
    }

    /// Short name of the scaler kind
    pub fn kind(&self) -> &'static str {
        match self {
            Scaler::Standard { .. } => "standard",
            Scaler::MinMax { .. } => "min_max",
        }
    }

    /// Number of inputs the scaler was fitted on
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { min, .. } => min.len(),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        match self {
            Scaler::Standard { features, .. } | Scaler::MinMax { features, .. } => features,
        }
    }

    /// Offset and scale pairs, for display
    pub fn parameters(&self) -> (&[f64], &[f64]) {
        match self {
            Scaler::Standard { mean, scale, .. } => (mean, scale),
            Scaler::MinMax { min, scale, .. } => (min, scale),
        }
    }

    /// Check that the parameters are usable for the three numeric applicant fields
    pub fn validate(&self) -> Result<(), PipelineError> {
        let (offset, scale) = self.parameters();

        if offset.len() != scale.len() {
            return Err(PipelineError::InvalidArtifact(format!(
                "{} scaler has {} offsets but {} scales",
                self.kind(),
                offset.len(),
                scale.len()
            )));
        }

        if offset.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::InvalidArtifact(format!(
                "{} scaler has non-finite parameters",
                self.kind()
            )));
        }

        if self.n_features() != NUMERIC_COLUMNS.len() {
            return Err(PipelineError::Scaling(format!(
                "scaler expects {} inputs, the pipeline supplies {} ({})",
                self.n_features(),
                NUMERIC_COLUMNS.len(),
                NUMERIC_COLUMNS.join(", ")
            )));
        }

        let names = self.feature_names();
        if !names.is_empty() && names.iter().map(String::as_str).ne(NUMERIC_COLUMNS) {
            return Err(PipelineError::Scaling(format!(
                "scaler was fitted on [{}], expected [{}]",
                names.join(", "),
                NUMERIC_COLUMNS.join(", ")
            )));
        }

        Ok(())
    }

    /// Apply the transform to one row of numeric inputs
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, PipelineError> {
        if values.len() != self.n_features() {
            return Err(PipelineError::Scaling(format!(
                "scaler expects {} inputs, got {}",
                self.n_features(),
                values.len()
            )));
        }

        let scaled = match self {
            Scaler::Standard { mean, scale, .. } => values
                .iter()
                .zip(mean.iter().zip(scale.iter()))
                .map(|(&x, (&m, &s))| (x - m) / if s == 0.0 { 1.0 } else { s })
                .collect(),
            Scaler::MinMax { min, scale, .. } => values
                .iter()
                .zip(min.iter().zip(scale.iter()))
                .map(|(&x, (&lo, &s))| x * s + lo)
                .collect(),
        };

        Ok(scaled)
    }
}
