//! Inference engine: reconstruct, transform, score, threshold, label, explain

use crate::bundle::ArtifactBundle;
use crate::error::{IncomeLensError, Result};
use crate::explain::{TopFactor, SERVING_TOP_K};
use crate::preprocessing::ColumnType;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A single scalar feature value from a prediction request.
///
/// Untagged so JSON numbers and strings both deserialize directly; a JSON
/// null (or an absent key) arrives as `None` in the surrounding map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

/// One prediction request's features, keyed by column name
pub type FeatureRow = HashMap<String, Option<FeatureValue>>;

/// Result of a single prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    pub probability: Option<f64>,
    pub threshold: f64,
    pub positive_label: String,
    pub model: String,
    pub top_factors: Option<Vec<TopFactor>>,
}

/// Scores single rows against an immutable loaded bundle.
///
/// The bundle is shared read-only across all concurrent requests; every
/// prediction is a pure function of the fitted state plus the request row,
/// so no locking is involved.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    bundle: Arc<ArtifactBundle>,
}

impl InferenceEngine {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self { bundle }
    }

    pub fn is_ready(&self) -> bool {
        self.bundle.loaded()
    }

    /// Predict one row.
    ///
    /// Errors: [`IncomeLensError::ModelNotFitted`] when no bundle is loaded;
    /// [`IncomeLensError::InvalidInput`] when the row cannot be reconstructed
    /// or transformed. Neither touches the bundle state.
    pub fn predict(&self, features: &FeatureRow) -> Result<PredictionResult> {
        let pipeline = self
            .bundle
            .pipeline()
            .ok_or(IncomeLensError::ModelNotFitted)?;

        let frame = self.row_to_frame(features)?;
        let x = pipeline
            .preprocessor
            .transform(&frame)
            .map_err(|e| IncomeLensError::InvalidInput(format!("row transform failed: {}", e)))?;

        let threshold = self.bundle.threshold();
        let proba = pipeline
            .model
            .predict_proba(&x)
            .map_err(|e| IncomeLensError::InferenceError(e.to_string()))?
            .map(|p| p[0]);

        let pred_code = match proba {
            Some(p) => {
                if p >= threshold {
                    1
                } else {
                    0
                }
            }
            None => {
                let hard = pipeline
                    .model
                    .predict(&x)
                    .map_err(|e| IncomeLensError::InferenceError(e.to_string()))?;
                hard[0].round() as i64
            }
        };

        let mapping = self.bundle.label_mapping();
        let label = mapping
            .get(&pred_code.to_string())
            .cloned()
            .unwrap_or_else(|| pred_code.to_string());

        let captured = self.bundle.top_factors();
        let top_factors = if captured.is_empty() {
            None
        } else {
            Some(captured.into_iter().take(SERVING_TOP_K).collect())
        };

        Ok(PredictionResult {
            label,
            probability: proba,
            threshold,
            positive_label: self.bundle.positive_label(),
            model: self.bundle.model_name(),
            top_factors,
        })
    }

    /// Rebuild a one-row DataFrame in the stored schema order. Features not
    /// present in the row become nulls for the preprocessor to impute.
    fn row_to_frame(&self, features: &FeatureRow) -> Result<DataFrame> {
        let pipeline = self
            .bundle
            .pipeline()
            .ok_or(IncomeLensError::ModelNotFitted)?;
        let schema = pipeline
            .preprocessor
            .schema()
            .ok_or(IncomeLensError::ModelNotFitted)?;

        let mut columns: Vec<Column> = Vec::with_capacity(schema.len());

        for (name, ctype) in schema.iter() {
            let value = features.get(name).and_then(|v| v.as_ref());
            let column = match ctype {
                ColumnType::Numeric => {
                    let v: Option<f64> = match value {
                        Some(FeatureValue::Number(n)) => Some(*n),
                        Some(FeatureValue::Text(s)) => {
                            let parsed = s.trim().parse::<f64>().map_err(|_| {
                                IncomeLensError::InvalidInput(format!(
                                    "feature '{}' expects a number, got '{}'",
                                    name, s
                                ))
                            })?;
                            Some(parsed)
                        }
                        None => None,
                    };
                    Column::new(name.as_str().into(), vec![v])
                }
                ColumnType::Categorical => {
                    let v: Option<String> = match value {
                        Some(FeatureValue::Text(s)) => Some(s.clone()),
                        Some(FeatureValue::Number(n)) => {
                            // A numeric value for a categorical column is its
                            // display form; integers keep integer formatting.
                            if n.fract() == 0.0 && n.abs() < 1e15 {
                                Some(format!("{}", *n as i64))
                            } else {
                                Some(format!("{}", n))
                            }
                        }
                        None => None,
                    };
                    Column::new(name.as_str().into(), vec![v])
                }
            };
            columns.push(column);
        }

        DataFrame::new(columns).map_err(|e| IncomeLensError::InvalidInput(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_value_deserialization() {
        let row: FeatureRow = serde_json::from_str(
            r#"{"age": 37, "workclass": "Private", "hours": null}"#,
        )
        .unwrap();

        assert_eq!(row.get("age"), Some(&Some(FeatureValue::Number(37.0))));
        assert_eq!(
            row.get("workclass"),
            Some(&Some(FeatureValue::Text("Private".to_string())))
        );
        assert_eq!(row.get("hours"), Some(&None));
    }

    #[test]
    fn test_predict_without_bundle_is_not_ready() {
        let bundle = Arc::new(ArtifactBundle::new("/nonexistent/artifacts"));
        let engine = InferenceEngine::new(bundle);
        assert!(!engine.is_ready());

        let err = engine.predict(&FeatureRow::new()).unwrap_err();
        assert!(matches!(err, IncomeLensError::ModelNotFitted));
    }
}
