//! The closed set of classifier families

use super::logistic::LogisticRegression;
use super::random_forest::RandomForest;
use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// The two candidate model families, behind one fit/predict surface.
///
/// A closed enum rather than a trait object: the set of families is part of
/// the selection protocol, and serialization of the fitted winner needs a
/// concrete tagged representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifierFamily {
    Linear(LogisticRegression),
    Ensemble(RandomForest),
}

impl ClassifierFamily {
    /// Family name as recorded in artifact metadata.
    pub fn name(&self) -> &'static str {
        match self {
            ClassifierFamily::Linear(_) => "LogisticRegression",
            ClassifierFamily::Ensemble(_) => "RandomForest",
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            ClassifierFamily::Linear(m) => {
                m.fit(x, y)?;
            }
            ClassifierFamily::Ensemble(m) => {
                m.fit(x, y)?;
            }
        }
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            ClassifierFamily::Linear(m) => m.predict(x),
            ClassifierFamily::Ensemble(m) => m.predict(x),
        }
    }

    /// Positive-class probabilities, when the family supports them.
    ///
    /// Both current families do; callers must still handle `None` so a
    /// future probability-free family degrades to hard predictions.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Option<Array1<f64>>> {
        match self {
            ClassifierFamily::Linear(m) => Ok(Some(m.predict_proba(x)?)),
            ClassifierFamily::Ensemble(m) => Ok(Some(m.predict_proba(x)?)),
        }
    }

    /// Signed coefficients (linear family only).
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        match self {
            ClassifierFamily::Linear(m) => m.coefficients.as_ref(),
            ClassifierFamily::Ensemble(_) => None,
        }
    }

    /// Unsigned feature importances (ensemble family only).
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        match self {
            ClassifierFamily::Linear(_) => None,
            ClassifierFamily::Ensemble(m) => m.feature_importances(),
        }
    }
}
