//! Feature vector construction
//!
//! Turns one applicant record into the ordered numeric row the classifier
//! was trained on: encode the categorical fields, scale the numeric ones,
//! then project onto the trained column order.

use serde::{Deserialize, Serialize};

use super::encoder::{CategoricalField, EncoderSet};
use super::error::PipelineError;
use super::record::ApplicantRecord;
use super::scaler::Scaler;

/// Numeric columns of the assembled row, in scaler order
pub const NUMERIC_COLUMNS: [&str; 3] = ["Age", "Credit amount", "Duration"];

/// Every column the pipeline produces, in assembled-row order
pub fn assembled_columns() -> Vec<&'static str> {
    NUMERIC_COLUMNS
        .iter()
        .copied()
        .chain(CategoricalField::ALL.iter().map(|f| f.column_name()))
        .collect()
}

/// The column order the classifier was trained with (`feature_cols`).
///
/// Validated on construction: non-empty, no duplicates, and every column is
/// one the pipeline can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ColumnOrder(Vec<String>);

impl TryFrom<Vec<String>> for ColumnOrder {
    type Error = PipelineError;

    fn try_from(columns: Vec<String>) -> Result<Self, Self::Error> {
        ColumnOrder::new(columns)
    }
}

impl From<ColumnOrder> for Vec<String> {
    fn from(order: ColumnOrder) -> Self {
        order.0
    }
}

impl ColumnOrder {
    pub fn new(columns: Vec<String>) -> Result<Self, PipelineError> {
        if columns.is_empty() {
            return Err(PipelineError::InvalidArtifact(
                "feature column order is empty".to_string(),
            ));
        }

        let known = assembled_columns();
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(PipelineError::InvalidArtifact(format!(
                    "feature column '{}' appears more than once",
                    column
                )));
            }
            if !known.contains(&column.as_str()) {
                return Err(PipelineError::MissingFeature {
                    column: column.clone(),
                });
            }
        }

        Ok(Self(columns))
    }

    /// The column order used at training time
    pub fn default_order() -> Self {
        Self(assembled_columns().into_iter().map(String::from).collect())
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Assembled-row columns this order does not use
    pub fn unused_columns(&self) -> Vec<&'static str> {
        assembled_columns()
            .into_iter()
            .filter(|c| !self.0.iter().any(|o| o == c))
            .collect()
    }
}

/// Model-ready numeric row, in `ColumnOrder` order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pair each value with its column name
    pub fn named<'a>(&'a self, order: &'a ColumnOrder) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        order
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.0.iter().copied())
    }
}

/// Single assembled row: column name and value, before projection
struct FeatureRow {
    entries: Vec<(&'static str, f64)>,
}

impl FeatureRow {
    fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| *value)
    }

    fn set(&mut self, column: &str, value: f64) {
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == column) {
            entry.1 = value;
        }
    }
}

/// Build the classifier input for one applicant.
///
/// Columns the row has but `columns` does not mention are dropped. A column
/// requested by `columns` that the row lacks is a `MissingFeature` error.
pub fn build_feature_vector(
    record: &ApplicantRecord,
    encoders: &EncoderSet,
    scaler: &Scaler,
    columns: &ColumnOrder,
) -> Result<FeatureVector, PipelineError> {
    let codes = encoders.encode_record(record)?;

    let mut row = FeatureRow {
        entries: NUMERIC_COLUMNS
            .iter()
            .copied()
            .zip(record.numeric_values())
            .chain(
                CategoricalField::ALL
                    .iter()
                    .map(|f| f.column_name())
                    .zip(codes.iter().map(|&c| c as f64)),
            )
            .collect(),
    };

    let raw: Vec<f64> = NUMERIC_COLUMNS
        .iter()
        .filter_map(|c| row.get(c))
        .collect();
    let scaled = scaler.transform(&raw)?;
    if scaled.len() != NUMERIC_COLUMNS.len() {
        return Err(PipelineError::Scaling(format!(
            "scaler returned {} values for {} inputs",
            scaled.len(),
            NUMERIC_COLUMNS.len()
        )));
    }
    for (column, value) in NUMERIC_COLUMNS.iter().zip(scaled) {
        row.set(column, value);
    }

    let values = columns
        .columns()
        .iter()
        .map(|column| {
            row.get(column).ok_or_else(|| PipelineError::MissingFeature {
                column: column.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureVector(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encoder::LabelEncoder;

    fn encoder(name: &str, classes: &[&str]) -> LabelEncoder {
        LabelEncoder::new(name, classes.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn encoders() -> EncoderSet {
        EncoderSet {
            sex: encoder("sex", &["female", "male"]),
            housing: encoder("housing", &["free", "own", "rent"]),
            saving_account: encoder("saving_account", &["little", "moderate", "quite rich", "rich"]),
            checking_account: encoder("checking_account", &["little", "moderate", "rich"]),
            purpose: encoder("purpose", &["business", "car", "education"]),
        }
    }

    fn record() -> ApplicantRecord {
        ApplicantRecord {
            age: 30,
            credit_amount: 1000.0,
            duration_months: 12,
            sex: "male".to_string(),
            housing: "own".to_string(),
            saving_account: "little".to_string(),
            checking_account: "moderate".to_string(),
            purpose: "car".to_string(),
        }
    }

    fn identity_scaler() -> Scaler {
        Scaler::standard(vec![0.0; 3], vec![1.0; 3])
    }

    #[test]
    fn test_default_order_values() {
        let fv = build_feature_vector(
            &record(),
            &encoders(),
            &identity_scaler(),
            &ColumnOrder::default_order(),
        )
        .unwrap();
        assert_eq!(fv.values(), &[30.0, 1000.0, 12.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_scaler_touches_only_numeric_columns() {
        let scaler = Scaler::standard(vec![20.0, 0.0, 0.0], vec![10.0, 1000.0, 12.0]);
        let fv = build_feature_vector(&record(), &encoders(), &scaler, &ColumnOrder::default_order())
            .unwrap();
        assert_eq!(fv.values(), &[1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_projection_follows_column_order() {
        let order = ColumnOrder::new(vec![
            "Purpose_encoded".to_string(),
            "Duration".to_string(),
            "Age".to_string(),
        ])
        .unwrap();
        let fv = build_feature_vector(&record(), &encoders(), &identity_scaler(), &order).unwrap();
        assert_eq!(fv.values(), &[1.0, 12.0, 30.0]);
    }

    #[test]
    fn test_unknown_category_aborts() {
        let mut rec = record();
        rec.purpose = "spaceship".to_string();
        let err = build_feature_vector(&rec, &encoders(), &identity_scaler(), &ColumnOrder::default_order())
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownCategory { .. }));
    }

    #[test]
    fn test_wrong_scaler_width() {
        let scaler = Scaler::standard(vec![0.0; 2], vec![1.0; 2]);
        let err = build_feature_vector(&record(), &encoders(), &scaler, &ColumnOrder::default_order())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Scaling(_)));
    }

    #[test]
    fn test_column_order_rejects_unknown_column() {
        let err = ColumnOrder::new(vec!["Age".to_string(), "Job".to_string()]).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingFeature {
                column: "Job".to_string()
            }
        );
    }

    #[test]
    fn test_column_order_rejects_duplicates() {
        let err = ColumnOrder::new(vec!["Age".to_string(), "Age".to_string()]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_column_order_rejects_empty() {
        assert!(ColumnOrder::new(Vec::new()).is_err());
    }

    #[test]
    fn test_unused_columns() {
        let order = ColumnOrder::new(vec!["Age".to_string(), "Sex_encoded".to_string()]).unwrap();
        let unused = order.unused_columns();
        assert_eq!(unused.len(), 6);
        assert!(unused.contains(&"Duration"));
        assert!(!unused.contains(&"Age"));
    }

    #[test]
    fn test_column_order_deserialize_validates() {
        let ok: ColumnOrder = serde_json::from_str(r#"["Age", "Duration"]"#).unwrap();
        assert_eq!(ok.len(), 2);
        let bad: Result<ColumnOrder, _> = serde_json::from_str(r#"["Age", "Telephone"]"#);
        assert!(bad.is_err());
    }
}
