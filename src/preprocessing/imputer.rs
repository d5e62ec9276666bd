//! Missing value imputation

use crate::error::{IncomeLensError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fallback category when a categorical column has no observed values at all
/// (e.g. every entry was a `"?"` marker before cleaning).
const SYNTHETIC_MISSING: &str = "missing";

/// Strategy for imputing missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the column median (numeric columns)
    Median,
    /// Replace with the most frequent value (categorical columns)
    MostFrequent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum FillValue {
    Numeric(f64),
    Text(String),
}

/// Imputer that learns per-column fill values at fit time and applies them
/// deterministically at transform time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: HashMap<String, FillValue>,
    is_fitted: bool,
}

impl Imputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn fill values for the given columns.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| IncomeLensError::FeatureNotFound(col_name.to_string()))?;

            let fill_value = self.compute_fill_value(column.as_materialized_series())?;
            self.fill_values.insert(col_name.to_string(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Fill nulls in every fitted column that is present in the frame.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(IncomeLensError::ModelNotFitted);
        }

        let mut result = df.clone();

        for (col_name, fill_value) in &self.fill_values {
            if let Ok(col) = df.column(col_name) {
                let filled = Self::fill_series(col.as_materialized_series(), fill_value)?;
                result = result
                    .with_column(filled)
                    .map_err(|e| IncomeLensError::DataError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    fn compute_fill_value(&self, series: &Series) -> Result<FillValue> {
        match self.strategy {
            ImputeStrategy::Median => {
                let median = series
                    .f64()
                    .map_err(|e| IncomeLensError::DataError(e.to_string()))?
                    .median()
                    .unwrap_or(0.0);
                Ok(FillValue::Numeric(median))
            }
            ImputeStrategy::MostFrequent => {
                let mode = Self::compute_mode_string(series)?;
                Ok(FillValue::Text(mode))
            }
        }
    }

    /// Mode of a string series. An all-null column yields the synthetic
    /// `"missing"` category so the pipeline still fits.
    fn compute_mode_string(series: &Series) -> Result<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();

        let ca = series
            .str()
            .map_err(|e| IncomeLensError::DataError(e.to_string()))?;
        for val in ca.into_iter().flatten() {
            *counts.entry(val.to_string()).or_insert(0) += 1;
        }

        let mode = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(k, _)| k)
            .unwrap_or_else(|| SYNTHETIC_MISSING.to_string());

        Ok(mode)
    }

    fn fill_series(series: &Series, fill_value: &FillValue) -> Result<Series> {
        match fill_value {
            FillValue::Numeric(val) => {
                let ca = series
                    .f64()
                    .map_err(|e| IncomeLensError::DataError(e.to_string()))?;

                let filled: Float64Chunked = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*val)))
                    .collect();

                Ok(filled.with_name(series.name().clone()).into_series())
            }
            FillValue::Text(val) => {
                let ca = series
                    .str()
                    .map_err(|e| IncomeLensError::DataError(e.to_string()))?;

                let filled: StringChunked = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(val.as_str()).to_string()))
                    .collect();

                Ok(filled.with_name(series.name().clone()).into_series())
            }
        }
    }
}
