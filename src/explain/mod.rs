//! Lightweight model explanations
//!
//! Ranks post-encoding features by coefficient magnitude (linear family) or
//! impurity-decrease importance (ensemble family). Extraction failures never
//! abort a training run; they degrade to an empty list.

use crate::training::FittedPipeline;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default number of factors captured at training time
pub const TRAINING_TOP_K: usize = 10;
/// Number of factors re-exposed through the serving response
pub const SERVING_TOP_K: usize = 8;

/// A post-encoding feature and its contribution to the fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopFactor {
    /// Post-encoding feature name, e.g. `workclass=Private`
    pub feature: String,
    /// Signed coefficient (linear family)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Unsigned importance (ensemble family)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
}

/// Extract the top-k factors from a fitted pipeline.
///
/// Linear family: coefficients ranked by absolute value, emitted with sign.
/// Ensemble family: feature importances ranked by value. A shape mismatch
/// between scores and feature names yields an empty list, never an error.
pub fn top_factors(pipeline: &FittedPipeline, k: usize) -> Vec<TopFactor> {
    let names = pipeline.preprocessor.output_feature_names();

    if let Some(coefs) = pipeline.model.coefficients() {
        if coefs.len() != names.len() {
            warn!(
                coefficients = coefs.len(),
                features = names.len(),
                "Coefficient count does not match feature names; skipping explanation"
            );
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f64)> =
            coefs.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| {
            b.1.abs()
                .partial_cmp(&a.1.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        return ranked
            .into_iter()
            .take(k)
            .map(|(i, w)| TopFactor {
                feature: names[i].clone(),
                weight: Some(w),
                importance: None,
            })
            .collect();
    }

    if let Some(importances) = pipeline.model.feature_importances() {
        if importances.len() != names.len() {
            warn!(
                importances = importances.len(),
                features = names.len(),
                "Importance count does not match feature names; skipping explanation"
            );
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f64)> =
            importances.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        return ranked
            .into_iter()
            .take(k)
            .map(|(i, imp)| TopFactor {
                feature: names[i].clone(),
                weight: None,
                importance: Some(imp),
            })
            .collect();
    }

    warn!("Fitted model exposes neither coefficients nor importances; explanation is empty");
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::TabularPreprocessor;
    use crate::training::{ClassifierFamily, LogisticRegression, RandomForest};
    use ndarray::Array1;
    use polars::prelude::*;

    fn fitted_pipeline(model: ClassifierFamily) -> FittedPipeline {
        let df = df!(
            "age" => &[20.0, 30.0, 60.0, 70.0],
            "hours" => &[10.0, 20.0, 50.0, 60.0]
        )
        .unwrap();

        let mut preprocessor = TabularPreprocessor::new();
        let x = preprocessor.fit_transform(&df).unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 1.0, 1.0]);

        let mut model = model;
        model.fit(&x, &y).unwrap();

        FittedPipeline {
            preprocessor,
            model,
        }
    }

    #[test]
    fn test_linear_factors_signed_and_ranked() {
        let pipeline = fitted_pipeline(ClassifierFamily::Linear(LogisticRegression::new(0.01)));
        let factors = top_factors(&pipeline, 10);

        assert!(!factors.is_empty());
        assert!(factors.len() <= 2);
        assert!(factors[0].weight.is_some());
        assert!(factors[0].importance.is_none());

        // Descending magnitude
        for pair in factors.windows(2) {
            let a = pair[0].weight.unwrap_or(0.0).abs();
            let b = pair[1].weight.unwrap_or(0.0).abs();
            assert!(a >= b);
        }
    }

    #[test]
    fn test_ensemble_factors_unsigned() {
        let pipeline = fitted_pipeline(ClassifierFamily::Ensemble(RandomForest::new(10)));
        let factors = top_factors(&pipeline, 10);

        assert!(!factors.is_empty());
        assert!(factors[0].importance.is_some());
        assert!(factors[0].weight.is_none());
    }

    #[test]
    fn test_k_truncates() {
        let pipeline = fitted_pipeline(ClassifierFamily::Linear(LogisticRegression::new(0.01)));
        let factors = top_factors(&pipeline, 1);
        assert_eq!(factors.len(), 1);
    }

    #[test]
    fn test_factor_serializes_without_absent_field() {
        let factor = TopFactor {
            feature: "age".to_string(),
            weight: Some(1.5),
            importance: None,
        };
        let json = serde_json::to_string(&factor).unwrap();
        assert!(json.contains("weight"));
        assert!(!json.contains("importance"));
    }
}
