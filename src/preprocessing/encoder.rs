//! One-hot encoding for categorical columns

use crate::error::{IncomeLensError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One-hot encoder over a fixed vocabulary.
///
/// Categories are recorded in first-seen order at fit time, so the encoded
/// column layout is stable across fit/transform and across processes. Values
/// unseen during training encode as all-zero rather than erroring, which is
/// what keeps rare inference-time categories from crashing the serving path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    // (column name, categories in first-seen order), in fit-column order
    vocabulary: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            vocabulary: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn the category vocabulary for the given columns, in order.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.vocabulary.clear();

        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| IncomeLensError::FeatureNotFound(col_name.to_string()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| IncomeLensError::DataError(e.to_string()))?;

            let mut categories: Vec<String> = Vec::new();
            for val in ca.into_iter().flatten() {
                if !categories.iter().any(|c| c == val) {
                    categories.push(val.to_string());
                }
            }

            self.vocabulary.push((col_name.to_string(), categories));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column with one `f64` indicator column per
    /// category, named `column=value`, appended in vocabulary order.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(IncomeLensError::ModelNotFitted);
        }

        let mut result = df.clone();

        for (col_name, categories) in &self.vocabulary {
            let column = df
                .column(col_name)
                .map_err(|_| IncomeLensError::FeatureNotFound(col_name.to_string()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| IncomeLensError::DataError(e.to_string()))?;

            for category in categories {
                let values: Vec<f64> = ca
                    .into_iter()
                    .map(|v| if v == Some(category.as_str()) { 1.0 } else { 0.0 })
                    .collect();

                let name = Self::output_name(col_name, category);
                let series = Series::new(name.into(), values);
                result = result
                    .with_column(series)
                    .map_err(|e| IncomeLensError::DataError(e.to_string()))?
                    .clone();
            }

            result = result
                .drop(col_name)
                .map_err(|e| IncomeLensError::DataError(e.to_string()))?;
        }

        Ok(result)
    }

    /// Post-encoding column names, in output order.
    pub fn output_names(&self) -> Vec<String> {
        self.vocabulary
            .iter()
            .flat_map(|(col, cats)| cats.iter().map(|c| Self::output_name(col, c)))
            .collect()
    }

    fn output_name(column: &str, category: &str) -> String {
        format!("{}={}", column, category)
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onehot_first_seen_order() {
        let df = df!(
            "city" => &["NYC", "LA", "NYC", "SF"]
        )
        .unwrap();

        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["city".to_string()]).unwrap();

        assert_eq!(
            encoder.output_names(),
            vec!["city=NYC", "city=LA", "city=SF"]
        );

        let result = encoder.transform(&df).unwrap();
        assert!(result.column("city").is_err());
        let nyc = result.column("city=NYC").unwrap().f64().unwrap();
        assert_eq!(nyc.get(0), Some(1.0));
        assert_eq!(nyc.get(1), Some(0.0));
    }

    #[test]
    fn test_unknown_category_encodes_all_zero() {
        let train = df!("city" => &["NYC", "LA"]).unwrap();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["city".to_string()]).unwrap();

        let test = df!("city" => &["Tokyo"]).unwrap();
        let result = encoder.transform(&test).unwrap();

        let nyc = result.column("city=NYC").unwrap().f64().unwrap();
        let la = result.column("city=LA").unwrap().f64().unwrap();
        assert_eq!(nyc.get(0), Some(0.0));
        assert_eq!(la.get(0), Some(0.0));
    }
}
