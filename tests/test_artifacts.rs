//! Tests for loading, saving and validating artifact bundles

mod common;

use std::fs;

use credrisk::pipeline::{
    ArtifactBundle, CategoricalField, Classifier, RiskLabel, FEATURE_COLS_FILE, MODEL_FILE,
    SCALER_FILE,
};

#[test]
fn test_save_then_load_predicts_the_same() {
    let temp_dir = common::create_temp_artifacts();
    let loaded = ArtifactBundle::load(temp_dir.path()).unwrap();
    let original = common::sample_bundle();

    assert_eq!(loaded.columns(), original.columns());
    assert_eq!(loaded.model(), original.model());
    for record in common::create_random_applicants(25, 3) {
        assert_eq!(loaded.predict(&record).unwrap(), original.predict(&record).unwrap());
    }
}

#[test]
fn test_saved_layout() {
    let temp_dir = common::create_temp_artifacts();
    let dir = temp_dir.path();

    for file in [MODEL_FILE, SCALER_FILE, FEATURE_COLS_FILE] {
        assert!(dir.join(file).exists(), "{} should be written", file);
    }
    for field in CategoricalField::ALL {
        assert!(dir.join(field.artifact_file()).exists());
    }

    let columns: Vec<String> =
        serde_json::from_str(&fs::read_to_string(dir.join(FEATURE_COLS_FILE)).unwrap()).unwrap();
    assert_eq!(columns[0], "Age");
    assert_eq!(columns[7], "Purpose_encoded");
}

#[test]
fn test_encoder_names_come_from_their_field() {
    let temp_dir = common::create_temp_artifacts();
    fs::write(
        temp_dir.path().join("le_sex.json"),
        r#"{"classes": ["female", "male"]}"#,
    )
    .unwrap();

    let bundle = ArtifactBundle::load(temp_dir.path()).unwrap();
    assert_eq!(bundle.encoders().sex.name(), "sex");
}

#[test]
fn test_missing_encoder_file() {
    let temp_dir = common::create_temp_artifacts();
    fs::remove_file(temp_dir.path().join("le_purpose.json")).unwrap();

    let err = ArtifactBundle::load(temp_dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("le_purpose.json"));
}

#[test]
fn test_unknown_feature_column_rejected_at_load() {
    let temp_dir = common::create_temp_artifacts();
    fs::write(
        temp_dir.path().join(FEATURE_COLS_FILE),
        r#"["Age", "Credit amount", "Duration", "Sex_encoded", "Housing_encoded",
            "Saving_encoded", "Checking_encoded", "Job"]"#,
    )
    .unwrap();

    let err = ArtifactBundle::load(temp_dir.path()).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("feature_cols.json"));
    assert!(message.contains("Missing feature 'Job'"));
}

#[test]
fn test_unsorted_vocabulary_rejected_at_load() {
    let temp_dir = common::create_temp_artifacts();
    fs::write(
        temp_dir.path().join("le_housing.json"),
        r#"{"classes": ["own", "free", "rent"]}"#,
    )
    .unwrap();

    assert!(ArtifactBundle::load(temp_dir.path()).is_err());
}

#[test]
fn test_model_width_must_match_column_order() {
    let temp_dir = common::create_temp_artifacts();
    fs::write(
        temp_dir.path().join(FEATURE_COLS_FILE),
        r#"["Age", "Credit amount", "Duration"]"#,
    )
    .unwrap();

    let err = ArtifactBundle::load(temp_dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("expects 8 features but feature_cols lists 3"));
}

#[test]
fn test_corrupt_model_file() {
    let temp_dir = common::create_temp_artifacts();
    fs::write(temp_dir.path().join(MODEL_FILE), "{ not json").unwrap();

    let err = ArtifactBundle::load(temp_dir.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse artifact"));
}

#[test]
fn test_shipped_artifacts_load() {
    let bundle = ArtifactBundle::load(&common::shipped_artifacts()).unwrap();

    assert_eq!(bundle.model().kind(), "Random Forest");
    assert_eq!(bundle.model().n_features(), 8);
    assert!(bundle.warnings().is_empty());

    let result = bundle.predict(&common::good_applicant()).unwrap();
    assert_eq!(result.label, RiskLabel::GoodRisk);
    assert_eq!(result, common::sample_bundle().predict(&common::good_applicant()).unwrap());
}
