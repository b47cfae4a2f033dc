//! Label encoders for the categorical applicant fields
//!
//! A label encoder maps each label of a closed, sorted vocabulary to its
//! position in that vocabulary. The vocabulary is the one the classifier was
//! trained with, so it is never re-sorted or extended after load.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::record::ApplicantRecord;

/// The five categorical fields of an applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Sex,
    Housing,
    SavingAccount,
    CheckingAccount,
    Purpose,
}

impl CategoricalField {
    /// All categorical fields, in assembled-row order
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::Sex,
        CategoricalField::Housing,
        CategoricalField::SavingAccount,
        CategoricalField::CheckingAccount,
        CategoricalField::Purpose,
    ];

    /// Column name of the encoded value in the assembled row
    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalField::Sex => "Sex_encoded",
            CategoricalField::Housing => "Housing_encoded",
            CategoricalField::SavingAccount => "Saving_encoded",
            CategoricalField::CheckingAccount => "Checking_encoded",
            CategoricalField::Purpose => "Purpose_encoded",
        }
    }

    /// Artifact file holding this field's encoder
    pub fn artifact_file(self) -> &'static str {
        match self {
            CategoricalField::Sex => "le_sex.json",
            CategoricalField::Housing => "le_housing.json",
            CategoricalField::SavingAccount => "le_saving.json",
            CategoricalField::CheckingAccount => "le_checking.json",
            CategoricalField::Purpose => "le_purpose.json",
        }
    }

    /// Column name in the German Credit dataset
    pub fn dataset_column(self) -> &'static str {
        match self {
            CategoricalField::Sex => "Sex",
            CategoricalField::Housing => "Housing",
            CategoricalField::SavingAccount => "Saving accounts",
            CategoricalField::CheckingAccount => "Checking account",
            CategoricalField::Purpose => "Purpose",
        }
    }

    /// The record's raw label for this field
    pub fn value_of(self, record: &ApplicantRecord) -> &str {
        match self {
            CategoricalField::Sex => &record.sex,
            CategoricalField::Housing => &record.housing,
            CategoricalField::SavingAccount => &record.saving_account,
            CategoricalField::CheckingAccount => &record.checking_account,
            CategoricalField::Purpose => &record.purpose,
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoricalField::Sex => write!(f, "sex"),
            CategoricalField::Housing => write!(f, "housing"),
            CategoricalField::SavingAccount => write!(f, "saving_account"),
            CategoricalField::CheckingAccount => write!(f, "checking_account"),
            CategoricalField::Purpose => write!(f, "purpose"),
        }
    }
}

/// On-disk shape of an encoder artifact
#[derive(Deserialize)]
struct RawLabelEncoder {
    #[serde(default)]
    name: String,
    classes: Vec<String>,
}

/// Closed-vocabulary label <-> code mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawLabelEncoder")]
pub struct LabelEncoder {
    name: String,
    classes: Vec<String>,
    #[serde(skip)]
    codes: HashMap<String, usize>,
}

impl PartialEq for LabelEncoder {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.classes == other.classes
    }
}

impl TryFrom<RawLabelEncoder> for LabelEncoder {
    type Error = PipelineError;

    fn try_from(raw: RawLabelEncoder) -> Result<Self, Self::Error> {
        LabelEncoder::new(raw.name, raw.classes)
    }
}

impl LabelEncoder {
    /// Create an encoder from a vocabulary that is already in code order.
    ///
    /// The vocabulary must be non-empty and strictly ascending. An unsorted
    /// vocabulary is rejected rather than sorted, since sorting would shift
    /// the codes away from the ones the model was trained on.
    pub fn new(name: impl Into<String>, classes: Vec<String>) -> Result<Self, PipelineError> {
        let name = name.into();

        if classes.is_empty() {
            return Err(PipelineError::InvalidArtifact(format!(
                "encoder '{}' has an empty vocabulary",
                name
            )));
        }

        if let Some(pair) = classes.windows(2).find(|w| w[0] >= w[1]) {
            let reason = if pair[0] == pair[1] {
                "contains duplicate label"
            } else {
                "is not sorted at label"
            };
            return Err(PipelineError::InvalidArtifact(format!(
                "encoder '{}' vocabulary {} '{}'",
                name, reason, pair[1]
            )));
        }

        let codes = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect();

        Ok(Self {
            name,
            classes,
            codes,
        })
    }

    /// Replace the encoder name, keeping the vocabulary
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Encoder name, used in error messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The vocabulary in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Encode a label. Out-of-vocabulary labels are an error, never a default.
    pub fn encode(&self, label: &str) -> Result<usize, PipelineError> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: self.name.clone(),
                label: label.to_string(),
                vocabulary: self.classes.clone(),
            })
    }

    /// Decode a code back into its label
    pub fn decode(&self, code: i64) -> Result<&str, PipelineError> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.classes.get(idx))
            .map(String::as_str)
            .ok_or_else(|| PipelineError::UnknownCode {
                field: self.name.clone(),
                code,
                size: self.classes.len(),
            })
    }
}

/// One encoder per categorical field
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSet {
    pub sex: LabelEncoder,
    pub housing: LabelEncoder,
    pub saving_account: LabelEncoder,
    pub checking_account: LabelEncoder,
    pub purpose: LabelEncoder,
}

impl EncoderSet {
    pub fn get(&self, field: CategoricalField) -> &LabelEncoder {
        match field {
            CategoricalField::Sex => &self.sex,
            CategoricalField::Housing => &self.housing,
            CategoricalField::SavingAccount => &self.saving_account,
            CategoricalField::CheckingAccount => &self.checking_account,
            CategoricalField::Purpose => &self.purpose,
        }
    }

    /// Encode every categorical field of a record, in `CategoricalField::ALL` order
    pub fn encode_record(&self, record: &ApplicantRecord) -> Result<[usize; 5], PipelineError> {
        let mut codes = [0usize; 5];
        for (slot, field) in codes.iter_mut().zip(CategoricalField::ALL) {
            *slot = self.get(field).encode(field.value_of(record))?;
        }
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn housing() -> LabelEncoder {
        LabelEncoder::new(
            "housing",
            vec!["free".to_string(), "own".to_string(), "rent".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_codes_follow_vocabulary_position() {
        let enc = housing();
        assert_eq!(enc.encode("free").unwrap(), 0);
        assert_eq!(enc.encode("own").unwrap(), 1);
        assert_eq!(enc.encode("rent").unwrap(), 2);
    }

    #[test]
    fn test_unknown_label_is_error() {
        let enc = housing();
        match enc.encode("castle") {
            Err(PipelineError::UnknownCategory { field, label, vocabulary }) => {
                assert_eq!(field, "housing");
                assert_eq!(label, "castle");
                assert_eq!(vocabulary.len(), 3);
            }
            other => panic!("Expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_encoding_is_case_sensitive() {
        assert!(housing().encode("Own").is_err());
    }

    #[test]
    fn test_decode_roundtrip() {
        let enc = housing();
        for label in enc.classes() {
            let code = enc.encode(label).unwrap();
            assert_eq!(enc.decode(code as i64).unwrap(), label);
        }
    }

    #[test]
    fn test_decode_out_of_range() {
        let enc = housing();
        assert!(matches!(
            enc.decode(3),
            Err(PipelineError::UnknownCode { code: 3, size: 3, .. })
        ));
        assert!(enc.decode(-1).is_err());
    }

    #[test]
    fn test_unsorted_vocabulary_rejected() {
        let result = LabelEncoder::new("sex", vec!["male".to_string(), "female".to_string()]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("not sorted"));
    }

    #[test]
    fn test_duplicate_vocabulary_rejected() {
        let result = LabelEncoder::new("sex", vec!["male".to_string(), "male".to_string()]);
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        assert!(LabelEncoder::new("sex", Vec::new()).is_err());
    }

    #[test]
    fn test_deserialize_builds_lookup() {
        let enc: LabelEncoder =
            serde_json::from_str(r#"{"name": "sex", "classes": ["female", "male"]}"#).unwrap();
        assert_eq!(enc.encode("male").unwrap(), 1);
    }

    #[test]
    fn test_deserialize_rejects_unsorted() {
        let result: Result<LabelEncoder, _> =
            serde_json::from_str(r#"{"classes": ["rent", "own"]}"#);
        assert!(result.is_err());
    }
}
