//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

use credrisk::pipeline::{
    ApplicantRecord, ArtifactBundle, ColumnOrder, DecisionTree, EncoderSet, LabelEncoder, Model,
    RandomForest, Scaler,
};

pub const SEX: [&str; 2] = ["female", "male"];
pub const HOUSING: [&str; 3] = ["free", "own", "rent"];
pub const SAVING: [&str; 4] = ["little", "moderate", "quite rich", "rich"];
pub const CHECKING: [&str; 3] = ["little", "moderate", "rich"];
pub const PURPOSE: [&str; 8] = [
    "business",
    "car",
    "domestic appliances",
    "education",
    "furniture/equipment",
    "radio/TV",
    "repairs",
    "vacation/others",
];

fn encoder(name: &str, classes: &[&str]) -> LabelEncoder {
    LabelEncoder::new(name, classes.iter().map(|s| s.to_string()).collect()).unwrap()
}

/// Encoders with the German Credit vocabularies
pub fn sample_encoders() -> EncoderSet {
    EncoderSet {
        sex: encoder("sex", &SEX),
        housing: encoder("housing", &HOUSING),
        saving_account: encoder("saving_account", &SAVING),
        checking_account: encoder("checking_account", &CHECKING),
        purpose: encoder("purpose", &PURPOSE),
    }
}

/// Standard scaler fitted on the German Credit numeric columns
pub fn sample_scaler() -> Scaler {
    Scaler::standard(
        vec![35.546, 3271.258, 20.903],
        vec![11.3697, 2821.3251, 12.0528],
    )
}

/// Three-level stump: root split, one inner split on the left, three leaves
fn stump(
    root: (i64, f64),
    inner: (i64, f64),
    values: [[f64; 2]; 5],
) -> DecisionTree {
    DecisionTree {
        children_left: vec![1, 2, -1, -1, -1],
        children_right: vec![4, 3, -1, -1, -1],
        feature: vec![root.0, inner.0, -2, -2, -2],
        threshold: vec![root.1, inner.1, -2.0, -2.0, -2.0],
        value: values.iter().map(|v| v.to_vec()).collect(),
    }
}

/// Small forest over the default eight-column order.
///
/// For `good_applicant()` the trees vote [0.55, 0.45], [0.75, 0.25] and
/// [0.6, 0.4], so the prediction is good risk with confidence 0.6333...
pub fn sample_model() -> Model {
    Model::RandomForest(RandomForest {
        classes: vec![0, 1],
        n_features: 8,
        feature_importances: Some(vec![0.15, 0.25, 0.2, 0.0, 0.1, 0.15, 0.15, 0.0]),
        trees: vec![
            // Duration, then checking account
            stump(
                (2, 0.5),
                (6, 0.5),
                [[0.6, 0.4], [0.65, 0.35], [0.55, 0.45], [0.8, 0.2], [0.35, 0.65]],
            ),
            // Credit amount, then age
            stump(
                (1, 1.0),
                (0, -0.8),
                [[0.6, 0.4], [0.7, 0.3], [0.4, 0.6], [0.75, 0.25], [0.3, 0.7]],
            ),
            // Saving account, then housing on the right
            DecisionTree {
                children_left: vec![1, -1, 3, -1, -1],
                children_right: vec![2, -1, 4, -1, -1],
                feature: vec![5, -2, 4, -2, -2],
                threshold: vec![0.5, -2.0, 0.5, -2.0, -2.0],
                value: vec![
                    vec![0.65, 0.35],
                    vec![0.6, 0.4],
                    vec![0.7, 0.3],
                    vec![0.5, 0.5],
                    vec![0.85, 0.15],
                ],
            },
        ],
    })
}

pub fn sample_bundle() -> ArtifactBundle {
    ArtifactBundle::new(
        sample_model(),
        sample_scaler(),
        sample_encoders(),
        ColumnOrder::default_order(),
    )
    .unwrap()
}

/// Write the sample bundle into a fresh temporary directory
pub fn create_temp_artifacts() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    sample_bundle().save(temp_dir.path()).unwrap();
    temp_dir
}

/// The applicant from the default form values
pub fn good_applicant() -> ApplicantRecord {
    ApplicantRecord {
        age: 30,
        credit_amount: 1000.0,
        duration_months: 12,
        sex: "male".to_string(),
        housing: "own".to_string(),
        saving_account: "little".to_string(),
        checking_account: "little".to_string(),
        purpose: "car".to_string(),
    }
}

/// A young applicant asking for a large, long loan.
///
/// Votes [0.35, 0.65], [0.3, 0.7] and [0.6, 0.4]: bad risk with confidence 0.5833...
pub fn bad_applicant() -> ApplicantRecord {
    ApplicantRecord {
        age: 22,
        credit_amount: 15000.0,
        duration_months: 48,
        sex: "female".to_string(),
        housing: "rent".to_string(),
        saving_account: "little".to_string(),
        checking_account: "moderate".to_string(),
        purpose: "business".to_string(),
    }
}

/// German Credit style dataset with one row missing a saving account
pub fn create_applicant_dataframe() -> DataFrame {
    df! {
        "Age" => [30i64, 22, 49, 35],
        "Sex" => ["male", "female", "male", "male"],
        "Job" => [2i64, 2, 1, 3],
        "Housing" => ["own", "rent", "own", "free"],
        "Saving accounts" => [Some("little"), Some("little"), None, Some("rich")],
        "Checking account" => ["little", "moderate", "little", "moderate"],
        "Credit amount" => [1000i64, 15000, 2096, 3000],
        "Duration" => [12i64, 48, 12, 24],
        "Purpose" => ["car", "business", "education", "radio/TV"],
        "Risk" => ["good", "bad", "good", "bad"],
    }
    .unwrap()
}

/// Random applicants drawn from the sample vocabularies
pub fn create_random_applicants(n: usize, seed: u64) -> Vec<ApplicantRecord> {
    use rand::prelude::*;
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    (0..n)
        .map(|_| ApplicantRecord {
            age: rng.gen_range(18..=100),
            credit_amount: rng.gen_range(100.0..=20_000.0),
            duration_months: rng.gen_range(1..=72),
            sex: SEX.choose(&mut rng).unwrap().to_string(),
            housing: HOUSING.choose(&mut rng).unwrap().to_string(),
            saving_account: SAVING.choose(&mut rng).unwrap().to_string(),
            checking_account: CHECKING.choose(&mut rng).unwrap().to_string(),
            purpose: PURPOSE.choose(&mut rng).unwrap().to_string(),
        })
        .collect()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("applicants.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("applicants.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Path to the artifacts shipped with the repository
pub fn shipped_artifacts() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets").join("artifacts")
}
