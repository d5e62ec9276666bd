//! Integration test: artifact bundle persistence

use incomelens::bundle::{ArtifactBundle, Metadata, METADATA_FILE, MODEL_FILE};
use incomelens::data::{clean_strings, load_csv, split_target};
use incomelens::explain::top_factors;
use incomelens::preprocessing::TabularPreprocessor;
use incomelens::training::{ClassifierFamily, FittedPipeline, LogisticRegression};
use ndarray::Array1;
use polars::prelude::*;
use std::io::Write;

fn small_fitted_pipeline() -> FittedPipeline {
    let df = df!(
        "age" => &[25.0, 30.0, 55.0, 60.0, 28.0, 58.0],
        "workclass" => &["Private", "Private", "Self-emp", "Self-emp", "Private", "Self-emp"]
    )
    .unwrap();

    let mut preprocessor = TabularPreprocessor::new();
    let x = preprocessor.fit_transform(&df).unwrap();
    let y = Array1::from_vec(vec![0.0, 0.0, 1.0, 1.0, 0.0, 1.0]);

    let mut model = ClassifierFamily::Linear(LogisticRegression::new(0.01));
    model.fit(&x, &y).unwrap();

    FittedPipeline {
        preprocessor,
        model,
    }
}

fn metadata_for(pipeline: &FittedPipeline, threshold: f64) -> Metadata {
    let schema = pipeline.preprocessor.schema().unwrap();
    Metadata {
        project: "IncomeLens".to_string(),
        model_name: "LogisticRegression".to_string(),
        test_f1: 0.81,
        target_column: "income".to_string(),
        positive_label: ">50K".to_string(),
        threshold,
        expected_features: schema.column_names(),
        numeric_features: schema.numeric_names(),
        categorical_features: schema.categorical_names(),
        label_mapping: Metadata::label_mapping_for(">50K"),
        top_factors: top_factors(pipeline, 10),
        trained_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

#[test]
fn test_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = small_fitted_pipeline();
    let meta = metadata_for(&pipeline, 0.5);

    ArtifactBundle::save(dir.path(), &pipeline, &meta).unwrap();

    let bundle = ArtifactBundle::open(dir.path()).unwrap();
    assert!(bundle.loaded());
    assert_eq!(bundle.expected_features(), vec!["age", "workclass"]);
    assert_eq!(bundle.threshold(), 0.5);
    assert_eq!(bundle.positive_label(), ">50K");
    assert_eq!(bundle.model_name(), "LogisticRegression");

    let mapping = bundle.label_mapping();
    assert_eq!(mapping.get("0").map(String::as_str), Some("<=50K"));
    assert_eq!(mapping.get("1").map(String::as_str), Some(">50K"));
}

#[test]
fn test_load_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = small_fitted_pipeline();
    let meta = metadata_for(&pipeline, 0.35);
    ArtifactBundle::save(dir.path(), &pipeline, &meta).unwrap();

    let a = ArtifactBundle::open(dir.path()).unwrap();
    let b = ArtifactBundle::open(dir.path()).unwrap();

    assert_eq!(a.expected_features(), b.expected_features());
    assert_eq!(a.threshold(), b.threshold());
    assert_eq!(a.label_mapping(), b.label_mapping());
    assert_eq!(a.model_name(), b.model_name());
}

#[test]
fn test_missing_artifacts_mean_not_loaded() {
    let dir = tempfile::tempdir().unwrap();

    let bundle = ArtifactBundle::open(dir.path()).unwrap();
    assert!(!bundle.loaded());
    assert!(bundle.expected_features().is_empty());
    assert_eq!(bundle.threshold(), 0.5);
    assert_eq!(bundle.label_mapping().get("0").map(String::as_str), Some("<=50K"));
}

#[test]
fn test_half_written_pair_is_not_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = small_fitted_pipeline();
    let meta = metadata_for(&pipeline, 0.5);
    ArtifactBundle::save(dir.path(), &pipeline, &meta).unwrap();

    // Remove the metadata half; the pair must not be treated as valid
    std::fs::remove_file(dir.path().join(METADATA_FILE)).unwrap();

    let bundle = ArtifactBundle::open(dir.path()).unwrap();
    assert!(!bundle.loaded());
    assert!(bundle.pipeline().is_none());
}

#[test]
fn test_corrupt_artifact_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = small_fitted_pipeline();
    let meta = metadata_for(&pipeline, 0.5);
    ArtifactBundle::save(dir.path(), &pipeline, &meta).unwrap();

    let mut f = std::fs::File::create(dir.path().join(MODEL_FILE)).unwrap();
    f.write_all(b"{ not valid json").unwrap();

    assert!(ArtifactBundle::open(dir.path()).is_err());
}

#[test]
fn test_missing_target_column_writes_no_artifacts() {
    // Scenario C: abort before training, nothing half-written
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("data.csv");
    std::fs::write(&csv_path, "age,workclass\n30,Private\n50,Self-emp\n").unwrap();

    let df = load_csv(&csv_path).unwrap();
    let df = clean_strings(&df).unwrap();
    let err = split_target(&df, "income", ">50K").unwrap_err();
    assert!(err.to_string().contains("income"));

    let artifacts_dir = dir.path().join("artifacts");
    assert!(!artifacts_dir.join(MODEL_FILE).exists());
    assert!(!artifacts_dir.join(METADATA_FILE).exists());
}

#[test]
fn test_metadata_json_keys() {
    let pipeline = small_fitted_pipeline();
    let meta = metadata_for(&pipeline, 0.5);
    let json: serde_json::Value = serde_json::to_value(&meta).unwrap();

    for key in [
        "model_name",
        "test_f1",
        "target_column",
        "positive_label",
        "threshold",
        "expected_features",
        "numeric_features",
        "categorical_features",
        "label_mapping",
        "top_factors",
    ] {
        assert!(json.get(key).is_some(), "metadata missing key {}", key);
    }
}
