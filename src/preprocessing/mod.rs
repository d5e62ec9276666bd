//! Data preprocessing: schema inference, imputation, encoding
//!
//! The preprocessing contract is what keeps training and serving consistent:
//! the [`FeatureSchema`] fixes the column order at fit time, and
//! [`TabularPreprocessor`] turns any table (or single reconstructed row) with
//! those columns into a fixed-width numeric matrix.

mod encoder;
mod imputer;
mod pipeline;

pub use encoder::OneHotEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::TabularPreprocessor;

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Type tag for an input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}

/// Ordered, typed list of feature columns, fixed at fit time.
///
/// The order is the source-table order with the target already removed, and
/// it is the canonical order used to reconstruct input rows at inference
/// time. Columns are never dropped or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<(String, ColumnType)>,
}

impl FeatureSchema {
    /// Infer the schema from a feature table (target already removed).
    ///
    /// Numeric-typed columns are Numeric; everything else is Categorical.
    /// String cleaning must already have run, so markers like `"?"` are
    /// nulls by now and do not affect typing.
    pub fn infer(df: &DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let name = col.name().to_string();
            let ctype = match col.dtype() {
                DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32
                | DataType::Float64 => ColumnType::Numeric,
                _ => ColumnType::Categorical,
            };
            columns.push((name, ctype));
        }

        Ok(Self { columns })
    }

    /// All column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Names of numeric columns, in schema order
    pub fn numeric_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, t)| *t == ColumnType::Numeric)
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Names of categorical columns, in schema order
    pub fn categorical_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, t)| *t == ColumnType::Categorical)
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Iterate columns as (name, type) pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = &(String, ColumnType)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order_matches_source() {
        let df = df!(
            "age" => &[25i64, 30],
            "workclass" => &["Private", "State-gov"],
            "hours" => &[40.0, 35.0]
        )
        .unwrap();

        let schema = FeatureSchema::infer(&df).unwrap();
        assert_eq!(schema.column_names(), vec!["age", "workclass", "hours"]);
        assert_eq!(schema.numeric_names(), vec!["age", "hours"]);
        assert_eq!(schema.categorical_names(), vec!["workclass"]);
    }
}
