//! Preprocessing pipeline: imputation + encoding into a numeric matrix

use super::{FeatureSchema, ImputeStrategy, Imputer, OneHotEncoder};
use crate::error::{IncomeLensError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Turns a table of mixed-typed, partially-missing values into a fixed-width
/// numeric matrix, consistently between training and inference.
///
/// `fit` learns per-column imputation statistics and the categorical
/// vocabulary; `transform` applies them deterministically and accepts
/// anything from the full training table down to a single reconstructed row
/// with nulls for missing values. Transform never consults the training
/// table again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabularPreprocessor {
    schema: Option<FeatureSchema>,
    numeric_imputer: Option<Imputer>,
    categorical_imputer: Option<Imputer>,
    encoder: Option<OneHotEncoder>,
    output_names: Vec<String>,
    is_fitted: bool,
}

impl TabularPreprocessor {
    pub fn new() -> Self {
        Self {
            schema: None,
            numeric_imputer: None,
            categorical_imputer: None,
            encoder: None,
            output_names: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit to a cleaned feature table (target already removed).
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let df = Self::cast_numeric_to_f64(df)?;
        let schema = FeatureSchema::infer(&df)?;

        let numeric_cols = schema.numeric_names();
        let categorical_cols = schema.categorical_names();

        let mut imputed = df.clone();

        if !numeric_cols.is_empty() {
            let mut imputer = Imputer::new(ImputeStrategy::Median);
            imputer.fit(&df, &numeric_cols)?;
            imputed = imputer.transform(&imputed)?;
            self.numeric_imputer = Some(imputer);
        }

        if !categorical_cols.is_empty() {
            let mut imputer = Imputer::new(ImputeStrategy::MostFrequent);
            imputer.fit(&df, &categorical_cols)?;
            imputed = imputer.transform(&imputed)?;

            let mut encoder = OneHotEncoder::new();
            encoder.fit(&imputed, &categorical_cols)?;
            self.encoder = Some(encoder);

            self.categorical_imputer = Some(imputer);
        }

        self.output_names = numeric_cols.clone();
        if let Some(ref encoder) = self.encoder {
            self.output_names.extend(encoder.output_names());
        }

        self.schema = Some(schema);
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a table (or single row) with the schema's columns into the
    /// fixed-width matrix. Missing values must be nulls.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(IncomeLensError::ModelNotFitted);
        }

        let mut result = Self::cast_numeric_to_f64(df)?;

        if let Some(ref imputer) = self.numeric_imputer {
            result = imputer.transform(&result)?;
        }
        if let Some(ref imputer) = self.categorical_imputer {
            result = imputer.transform(&result)?;
        }
        if let Some(ref encoder) = self.encoder {
            result = encoder.transform(&result)?;
        }

        // Assemble columns in the canonical output order: numeric columns in
        // schema order, then the one-hot blocks.
        let n_rows = result.height();
        let n_cols = self.output_names.len();
        let mut matrix = Array2::zeros((n_rows, n_cols));

        for (j, name) in self.output_names.iter().enumerate() {
            let column = result
                .column(name)
                .map_err(|_| IncomeLensError::FeatureNotFound(name.clone()))?;
            let ca = column
                .f64()
                .map_err(|e| IncomeLensError::DataError(e.to_string()))?;
            for (i, val) in ca.into_iter().enumerate() {
                matrix[[i, j]] = val.ok_or_else(|| {
                    IncomeLensError::PreprocessingError(format!(
                        "null survived imputation in column '{}'",
                        name
                    ))
                })?;
            }
        }

        Ok(matrix)
    }

    /// Fit and transform the same table in one step.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// The schema inferred at fit time.
    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.schema.as_ref()
    }

    /// Post-encoding feature names aligned with the matrix columns.
    pub fn output_feature_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Cast all integer and f32 columns to Float64 for consistent processing.
    fn cast_numeric_to_f64(df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();
        for col in df.get_columns() {
            match col.dtype() {
                DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32 => {
                    let casted = col
                        .cast(&DataType::Float64)
                        .map_err(|e| IncomeLensError::DataError(e.to_string()))?;
                    result = result
                        .with_column(casted.as_materialized_series().clone())
                        .map_err(|e| IncomeLensError::DataError(e.to_string()))?
                        .clone();
                }
                _ => {}
            }
        }
        Ok(result)
    }
}

impl Default for TabularPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}
