//! Artifact bundle: everything the pipeline needs, loaded once at startup
//!
//! Artifacts live in one directory, one JSON file each:
//! `model.json`, `scaler.json`, `feature_cols.json` and one `le_*.json`
//! encoder per categorical field. The bundle is validated as a whole on
//! construction and never mutated afterwards.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::classifier::{Classifier, Model};
use super::encoder::{CategoricalField, EncoderSet, LabelEncoder};
use super::error::PipelineError;
use super::features::{build_feature_vector, ColumnOrder, FeatureVector};
use super::prediction::{interpret_prediction, PredictionResult};
use super::record::ApplicantRecord;
use super::scaler::Scaler;

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const FEATURE_COLS_FILE: &str = "feature_cols.json";

/// Immutable, cross-validated set of artifacts
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    model: Model,
    scaler: Scaler,
    encoders: EncoderSet,
    columns: ColumnOrder,
}

impl ArtifactBundle {
    /// Assemble a bundle, checking that the artifacts agree with each other.
    pub fn new(
        model: Model,
        scaler: Scaler,
        encoders: EncoderSet,
        columns: ColumnOrder,
    ) -> Result<Self, PipelineError> {
        model.validate()?;
        scaler.validate()?;

        if model.n_features() != columns.len() {
            return Err(PipelineError::InvalidArtifact(format!(
                "{} expects {} features but feature_cols lists {}",
                model.kind(),
                model.n_features(),
                columns.len()
            )));
        }

        Ok(Self {
            model,
            scaler,
            encoders,
            columns,
        })
    }

    /// Load and validate all artifacts from a directory
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Artifact directory not found: {}", dir.display());
        }

        let model: Model = read_json(&dir.join(MODEL_FILE))?;
        let scaler: Scaler = read_json(&dir.join(SCALER_FILE))?;
        let columns: ColumnOrder = read_json(&dir.join(FEATURE_COLS_FILE))?;

        let load_encoder = |field: CategoricalField| -> Result<LabelEncoder> {
            let encoder: LabelEncoder = read_json(&dir.join(field.artifact_file()))?;
            Ok(encoder.renamed(field.to_string()))
        };
        let encoders = EncoderSet {
            sex: load_encoder(CategoricalField::Sex)?,
            housing: load_encoder(CategoricalField::Housing)?,
            saving_account: load_encoder(CategoricalField::SavingAccount)?,
            checking_account: load_encoder(CategoricalField::CheckingAccount)?,
            purpose: load_encoder(CategoricalField::Purpose)?,
        };

        Self::new(model, scaler, encoders, columns)
            .with_context(|| format!("Inconsistent artifacts in {}", dir.display()))
    }

    /// Write every artifact to `dir` in the layout `load` expects
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create artifact directory: {}", dir.display()))?;

        write_json(&dir.join(MODEL_FILE), &self.model)?;
        write_json(&dir.join(SCALER_FILE), &self.scaler)?;
        write_json(&dir.join(FEATURE_COLS_FILE), &self.columns)?;
        for field in CategoricalField::ALL {
            write_json(&dir.join(field.artifact_file()), self.encoders.get(field))?;
        }

        Ok(())
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn columns(&self) -> &ColumnOrder {
        &self.columns
    }

    /// Non-fatal observations about the bundle, for display after loading
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .columns
            .unused_columns()
            .into_iter()
            .map(|c| format!("Column '{}' is assembled but not used by the model", c))
            .collect();

        if self.model.classes() != [0, 1] {
            warnings.push(format!(
                "Model classes are {:?}; only 0 (good) and 1 (bad) can be interpreted",
                self.model.classes()
            ));
        }

        warnings
    }

    /// Feature vector for one applicant
    pub fn features(&self, record: &ApplicantRecord) -> Result<FeatureVector, PipelineError> {
        build_feature_vector(record, &self.encoders, &self.scaler, &self.columns)
    }

    /// Run the full pipeline for one applicant
    pub fn predict(&self, record: &ApplicantRecord) -> Result<PredictionResult, PipelineError> {
        record.validate()?;
        let features = self.features(record)?;
        let label = self.model.predict(&features)?;
        let probabilities = self.model.predict_proba(&features)?;
        interpret_prediction(label, &probabilities)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open artifact: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse artifact: {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create artifact: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write artifact: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classifier::LogisticRegression;

    fn encoder(name: &str, classes: &[&str]) -> LabelEncoder {
        LabelEncoder::new(name, classes.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn encoders() -> EncoderSet {
        EncoderSet {
            sex: encoder("sex", &["female", "male"]),
            housing: encoder("housing", &["free", "own", "rent"]),
            saving_account: encoder("saving_account", &["little", "rich"]),
            checking_account: encoder("checking_account", &["little", "rich"]),
            purpose: encoder("purpose", &["business", "car"]),
        }
    }

    fn logistic(n: usize) -> Model {
        Model::LogisticRegression(LogisticRegression {
            classes: vec![0, 1],
            coef: vec![0.1; n],
            intercept: 0.0,
        })
    }

    #[test]
    fn test_feature_count_mismatch_rejected() {
        let result = ArtifactBundle::new(
            logistic(3),
            Scaler::standard(vec![0.0; 3], vec![1.0; 3]),
            encoders(),
            ColumnOrder::default_order(),
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("expects 3 features but feature_cols lists 8"));
    }

    #[test]
    fn test_warnings_for_unused_columns() {
        let columns = ColumnOrder::new(vec!["Age".to_string(), "Duration".to_string()]).unwrap();
        let bundle = ArtifactBundle::new(
            logistic(2),
            Scaler::standard(vec![0.0; 3], vec![1.0; 3]),
            encoders(),
            columns,
        )
        .unwrap();
        let warnings = bundle.warnings();
        assert_eq!(warnings.len(), 6);
        assert!(warnings[0].contains("Credit amount"));
    }

    #[test]
    fn test_predict_validates_record_first() {
        let bundle = ArtifactBundle::new(
            logistic(8),
            Scaler::standard(vec![0.0; 3], vec![1.0; 3]),
            encoders(),
            ColumnOrder::default_order(),
        )
        .unwrap();
        let record = ApplicantRecord {
            age: 12,
            credit_amount: 1000.0,
            duration_months: 12,
            sex: "male".to_string(),
            housing: "own".to_string(),
            saving_account: "little".to_string(),
            checking_account: "little".to_string(),
            purpose: "car".to_string(),
        };
        assert!(matches!(
            bundle.predict(&record),
            Err(PipelineError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_load_missing_directory() {
        let err = ArtifactBundle::load(Path::new("/definitely/not/here")).unwrap_err();
        assert!(err.to_string().contains("Artifact directory not found"));
    }
}
