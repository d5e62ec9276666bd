//! Dataset loading and cleaning
//!
//! CSV ingestion plus the string normalization that has to happen before
//! anything looks at column types: every string column is trimmed, and the
//! literal markers `"?"` and `"nan"` become real nulls. The target column is
//! cleaned by the same pass, so it is already trimmed when it is compared
//! against the positive label.

use crate::error::{IncomeLensError, Result};
use ndarray::Array1;
use polars::prelude::*;
use std::path::Path;

/// Load a CSV dataset with header and schema inference.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IncomeLensError::ConfigError(format!(
            "dataset not found: {}",
            path.display()
        )));
    }

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df)
}

/// Normalize string columns: trim whitespace, map `"?"` and `"nan"` to null.
///
/// Runs over every string column, including the target. Must be applied
/// before type inference and before the target is split off.
pub fn clean_strings(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();

    for col in df.get_columns() {
        if col.dtype() != &DataType::String {
            continue;
        }
        let ca = col
            .str()
            .map_err(|e| IncomeLensError::DataError(e.to_string()))?;

        let cleaned: StringChunked = ca
            .into_iter()
            .map(|opt| {
                opt.and_then(|s| {
                    let trimmed = s.trim();
                    if trimmed.is_empty() || trimmed == "?" || trimmed == "nan" {
                        None
                    } else {
                        Some(trimmed.to_string())
                    }
                })
            })
            .collect();

        let series = cleaned.with_name(col.name().clone()).into_series();
        result = result
            .with_column(series)
            .map_err(|e| IncomeLensError::DataError(e.to_string()))?
            .clone();
    }

    Ok(result)
}

/// Split a cleaned dataset into a feature table and a binary target vector.
///
/// Rows whose target is missing are dropped, never imputed. The target is
/// encoded 1.0 where it equals `positive_label`, 0.0 otherwise.
pub fn split_target(
    df: &DataFrame,
    target: &str,
    positive_label: &str,
) -> Result<(DataFrame, Array1<f64>)> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    if !columns.iter().any(|c| c == target) {
        return Err(IncomeLensError::ConfigError(format!(
            "target column '{}' not in dataset columns: {:?}",
            target, columns
        )));
    }

    let target_col = df.column(target)?;

    // Drop rows with missing target before binarizing
    let present: BooleanChunked = target_col
        .as_materialized_series()
        .is_not_null();
    let df = df.filter(&present)?;

    let target_col = df.column(target)?;
    let y: Vec<f64> = match target_col.dtype() {
        DataType::String => target_col
            .str()
            .map_err(|e| IncomeLensError::DataError(e.to_string()))?
            .into_iter()
            .map(|opt| match opt {
                Some(s) if s.trim() == positive_label => 1.0,
                _ => 0.0,
            })
            .collect(),
        _ => {
            // Numeric target: positive when its display form matches
            let casted = target_col.cast(&DataType::String)?;
            casted
                .str()
                .map_err(|e| IncomeLensError::DataError(e.to_string()))?
                .into_iter()
                .map(|opt| match opt {
                    Some(s) if s.trim() == positive_label => 1.0,
                    _ => 0.0,
                })
                .collect()
        }
    };

    let features = df.drop(target)?;

    Ok((features, Array1::from_vec(y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_df() -> DataFrame {
        df!(
            "age" => &[Some(37i64), Some(50), None, Some(28)],
            "workclass" => &[" Private ", "?", "Self-emp", "nan"],
            "income" => &[" >50K", "<=50K", ">50K", "<=50K"]
        )
        .unwrap()
    }

    #[test]
    fn test_clean_strings_trims_and_nulls() {
        let df = clean_strings(&raw_df()).unwrap();
        let wc = df.column("workclass").unwrap().str().unwrap();
        assert_eq!(wc.get(0), Some("Private"));
        assert_eq!(wc.get(1), None);
        assert_eq!(wc.get(3), None);
    }

    #[test]
    fn test_target_trimmed_before_comparison() {
        let df = clean_strings(&raw_df()).unwrap();
        let (_, y) = split_target(&df, "income", ">50K").unwrap();
        assert_eq!(y[0], 1.0);
        assert_eq!(y[1], 0.0);
    }

    #[test]
    fn test_missing_target_column_is_config_error() {
        let df = raw_df();
        let err = split_target(&df, "salary", ">50K").unwrap_err();
        assert!(matches!(err, IncomeLensError::ConfigError(_)));
        assert!(err.to_string().contains("salary"));
    }

    #[test]
    fn test_missing_target_rows_dropped() {
        let df = df!(
            "age" => &[30i64, 40, 50],
            "income" => &[Some(">50K"), None, Some("<=50K")]
        )
        .unwrap();
        let (features, y) = split_target(&df, "income", ">50K").unwrap();
        assert_eq!(features.height(), 2);
        assert_eq!(y.len(), 2);
    }
}
