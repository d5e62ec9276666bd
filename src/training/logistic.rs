//! Class-weighted logistic regression

use crate::error::{IncomeLensError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Logistic regression for binary classification, fitted by gradient descent.
///
/// Class weights are inversely proportional to class frequency
/// (`n / (2 * n_c)` per class), so the minority positive class is not drowned
/// out on imbalanced targets. L2 regularization applies to the weights only,
/// never the intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// L2 regularization strength
    pub l2: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Base learning rate; decays as eta0 / (t + 1)^power_t
    pub learning_rate: f64,
    /// Inverse-scaling exponent for the learning-rate schedule
    pub power_t: f64,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl LogisticRegression {
    pub fn new(l2: f64) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            l2,
            max_iter: 2000,
            tol: 1e-6,
            learning_rate: 0.1,
            power_t: 0.5,
            is_fitted: false,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Balanced sample weights: n / (2 * n_class) for each sample's class.
    fn balanced_weights(y: &Array1<f64>) -> Array1<f64> {
        let n = y.len() as f64;
        let n_pos = y.iter().filter(|&&v| v > 0.5).count() as f64;
        let n_neg = n - n_pos;

        let w_pos = if n_pos > 0.0 { n / (2.0 * n_pos) } else { 0.0 };
        let w_neg = if n_neg > 0.0 { n / (2.0 * n_neg) } else { 0.0 };

        y.mapv(|v| if v > 0.5 { w_pos } else { w_neg })
    }

    /// Fit with weighted gradient descent.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(IncomeLensError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(IncomeLensError::TrainingError(
                "cannot fit on an empty matrix".to_string(),
            ));
        }

        let sample_weights = Self::balanced_weights(y);
        let mut weights = Array1::zeros(n_features);
        let mut bias = 0.0;

        let l2 = self.l2;

        for iter in 0..self.max_iter {
            let linear = x.dot(&weights) + bias;
            let predictions = Self::sigmoid(&linear);

            let errors = (&predictions - y) * &sample_weights;
            let dw = (x.t().dot(&errors) / n_samples as f64) + (l2 * &weights);
            let db = errors.sum() / n_samples as f64;

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            // Inverse scaling: eta0 / (t + 1)^power_t
            let lr = self.learning_rate / (iter as f64 + 1.0).powf(self.power_t);
            weights = weights - lr * dw;
            bias -= lr * db;
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.is_fitted = true;

        Ok(self)
    }

    /// Positive-class probabilities
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(IncomeLensError::ModelNotFitted)?;
        let intercept = self.intercept.unwrap_or(0.0);

        let linear = x.dot(coefficients) + intercept;
        Ok(Self::sigmoid(&linear))
    }

    /// Hard class labels with a 0.5 boundary
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }
}
