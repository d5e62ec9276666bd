//! Integration test: cleaning, schema inference, and the preprocessing pipeline

use incomelens::data::clean_strings;
use incomelens::preprocessing::{ColumnType, FeatureSchema, TabularPreprocessor};
use polars::prelude::*;

fn census_like_df() -> DataFrame {
    df!(
        "age" => &[Some(37i64), Some(50), None, Some(28), Some(45), Some(33)],
        "workclass" => &[" Private ", "?", "Self-emp", " Private", "nan", "State-gov"],
        "education" => &["Bachelors", "HS-grad", "Bachelors", "Masters", "HS-grad", "Bachelors"],
        "hours_per_week" => &[40.0, 45.0, 50.0, 38.0, 60.0, 42.0]
    )
    .unwrap()
}

#[test]
fn test_cleaning_then_schema_order() {
    let df = clean_strings(&census_like_df()).unwrap();
    let schema = FeatureSchema::infer(&df).unwrap();

    // Source-table order, nothing dropped or reordered
    assert_eq!(
        schema.column_names(),
        vec!["age", "workclass", "education", "hours_per_week"]
    );
    assert_eq!(schema.numeric_names(), vec!["age", "hours_per_week"]);
    assert_eq!(schema.categorical_names(), vec!["workclass", "education"]);
}

#[test]
fn test_question_mark_becomes_missing_then_mode() {
    let df = clean_strings(&census_like_df()).unwrap();

    let mut prep = TabularPreprocessor::new();
    prep.fit(&df).unwrap();

    // "?" and "nan" rows imputed with the mode "Private"; vocabulary holds
    // the trimmed values only
    let names = prep.output_feature_names();
    assert!(names.contains(&"workclass=Private".to_string()));
    assert!(!names.iter().any(|n| n.contains('?')));
    assert!(!names.iter().any(|n| n.contains(" Private")));
}

#[test]
fn test_transform_is_deterministic() {
    let df = clean_strings(&census_like_df()).unwrap();

    let mut prep = TabularPreprocessor::new();
    let a = prep.fit_transform(&df).unwrap();
    let b = prep.transform(&df).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_unknown_inference_category_is_all_zero() {
    let df = clean_strings(&census_like_df()).unwrap();
    let mut prep = TabularPreprocessor::new();
    prep.fit(&df).unwrap();

    let row = df!(
        "age" => &[Some(29.0)],
        "workclass" => &[Some("Without-pay")],
        "education" => &[Some("Doctorate")],
        "hours_per_week" => &[Some(40.0)]
    )
    .unwrap();

    let matrix = prep.transform(&row).unwrap();
    let names = prep.output_feature_names();

    for (j, name) in names.iter().enumerate() {
        if name.starts_with("workclass=") || name.starts_with("education=") {
            assert_eq!(matrix[[0, j]], 0.0, "unknown category leaked into {}", name);
        }
    }
}

#[test]
fn test_missing_values_in_single_row() {
    let df = clean_strings(&census_like_df()).unwrap();
    let mut prep = TabularPreprocessor::new();
    prep.fit(&df).unwrap();

    let row = df!(
        "age" => &[None::<f64>],
        "workclass" => &[None::<&str>],
        "education" => &[Some("Bachelors")],
        "hours_per_week" => &[None::<f64>]
    )
    .unwrap();

    let matrix = prep.transform(&row).unwrap();
    assert_eq!(matrix.nrows(), 1);
    // Medians of observed values: age [37,50,28,45,33] -> 37
    assert_eq!(matrix[[0, 0]], 37.0);
}

#[test]
fn test_all_question_marks_column_fits_with_synthetic_category() {
    let raw = df!(
        "age" => &[30i64, 40, 50, 60],
        "occupation" => &["?", "?", "?", "?"],
        "hours" => &[40.0, 20.0, 40.0, 10.0]
    )
    .unwrap();

    let df = clean_strings(&raw).unwrap();
    let mut prep = TabularPreprocessor::new();
    let matrix = prep.fit_transform(&df).unwrap();

    assert!(prep
        .output_feature_names()
        .contains(&"occupation=missing".to_string()));
    // Every row lands in the synthetic category
    let j = prep
        .output_feature_names()
        .iter()
        .position(|n| n == "occupation=missing")
        .unwrap();
    for i in 0..4 {
        assert_eq!(matrix[[i, j]], 1.0);
    }
}

#[test]
fn test_schema_types_round_trip_through_serde() {
    let df = clean_strings(&census_like_df()).unwrap();
    let schema = FeatureSchema::infer(&df).unwrap();

    let json = serde_json::to_string(&schema).unwrap();
    let restored: FeatureSchema = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.column_names(), schema.column_names());
    for ((_, a), (_, b)) in restored.iter().zip(schema.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_column_type_tags() {
    let df = df!(
        "n" => &[1.0f64],
        "c" => &["x"]
    )
    .unwrap();
    let schema = FeatureSchema::infer(&df).unwrap();
    let types: Vec<ColumnType> = schema.iter().map(|(_, t)| *t).collect();
    assert_eq!(types, vec![ColumnType::Numeric, ColumnType::Categorical]);
}
