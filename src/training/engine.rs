//! Model selection: grid search per family, held-out evaluation, winner pick

use super::cross_validation::{stratified_k_fold, stratified_train_test_split};
use super::logistic::LogisticRegression;
use super::metrics::f1_score;
use super::model::ClassifierFamily;
use super::random_forest::RandomForest;
use crate::error::{IncomeLensError, Result};
use crate::preprocessing::TabularPreprocessor;
use ndarray::Array1;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// L2 strengths searched for the linear family
const LINEAR_L2_GRID: [f64; 3] = [0.1, 0.01, 0.001];
/// Tree counts searched for the ensemble family
const FOREST_N_ESTIMATORS: [usize; 2] = [200, 400];
/// Max depths searched for the ensemble family
const FOREST_MAX_DEPTH: [Option<usize>; 3] = [None, Some(10), Some(20)];
/// Minimum split sizes searched for the ensemble family
const FOREST_MIN_SAMPLES_SPLIT: [usize; 2] = [2, 5];

/// Training configuration for the selection protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Held-out test fraction of the stratified split
    pub test_fraction: f64,
    /// Random seed driving the split, the folds, and the forest
    pub seed: u64,
    /// Cross-validation folds per grid candidate
    pub cv_folds: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            cv_folds: 3,
        }
    }
}

/// A fitted preprocessor + fitted model, the unit that gets persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub preprocessor: TabularPreprocessor,
    pub model: ClassifierFamily,
}

impl FittedPipeline {
    /// Positive-class probabilities for a raw (cleaned) feature table.
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Option<Array1<f64>>> {
        let x = self.preprocessor.transform(df)?;
        self.model.predict_proba(&x)
    }

    /// Hard class labels for a raw (cleaned) feature table.
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.preprocessor.transform(df)?;
        self.model.predict(&x)
    }
}

/// One point in a family's hyperparameter grid
#[derive(Debug, Clone, Copy, PartialEq)]
enum Candidate {
    Linear {
        l2: f64,
    },
    Ensemble {
        n_estimators: usize,
        max_depth: Option<usize>,
        min_samples_split: usize,
    },
}

impl Candidate {
    fn build(&self, seed: u64) -> ClassifierFamily {
        match *self {
            Candidate::Linear { l2 } => ClassifierFamily::Linear(LogisticRegression::new(l2)),
            Candidate::Ensemble {
                n_estimators,
                max_depth,
                min_samples_split,
            } => ClassifierFamily::Ensemble(
                RandomForest::new(n_estimators)
                    .with_max_depth(max_depth)
                    .with_min_samples_split(min_samples_split)
                    .with_random_state(seed),
            ),
        }
    }

    fn label(&self) -> String {
        match *self {
            Candidate::Linear { l2 } => format!("linear(l2={})", l2),
            Candidate::Ensemble {
                n_estimators,
                max_depth,
                min_samples_split,
            } => format!(
                "ensemble(trees={}, depth={:?}, min_split={})",
                n_estimators, max_depth, min_samples_split
            ),
        }
    }
}

fn linear_grid() -> Vec<Candidate> {
    LINEAR_L2_GRID
        .iter()
        .map(|&l2| Candidate::Linear { l2 })
        .collect()
}

fn ensemble_grid() -> Vec<Candidate> {
    let mut grid = Vec::new();
    for &n_estimators in &FOREST_N_ESTIMATORS {
        for &max_depth in &FOREST_MAX_DEPTH {
            for &min_samples_split in &FOREST_MIN_SAMPLES_SPLIT {
                grid.push(Candidate::Ensemble {
                    n_estimators,
                    max_depth,
                    min_samples_split,
                });
            }
        }
    }
    grid
}

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// The winning fitted pipeline
    pub pipeline: FittedPipeline,
    /// Winning family name
    pub model_name: String,
    /// Held-out F1 of the winner
    pub test_f1: f64,
    /// Held-out F1 of the linear family's best configuration
    pub linear_f1: f64,
    /// Held-out F1 of the ensemble family's best configuration
    pub ensemble_f1: f64,
}

/// Grid-searches both families under cross-validation and selects the winner
/// by held-out F1.
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Run the full selection protocol on a cleaned feature table + binary
    /// target.
    pub fn fit(&self, features: &DataFrame, y: &Array1<f64>) -> Result<TrainingOutcome> {
        if features.height() != y.len() {
            return Err(IncomeLensError::ShapeError {
                expected: format!("{} target rows", features.height()),
                actual: format!("{} target rows", y.len()),
            });
        }

        let (train_idx, test_idx) =
            stratified_train_test_split(y, self.config.test_fraction, self.config.seed)?;

        let train_df = take_rows(features, &train_idx)?;
        let test_df = take_rows(features, &test_idx)?;
        let y_train = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
        let y_test = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

        info!(
            train_rows = train_df.height(),
            test_rows = test_df.height(),
            "Running grid search for the linear family"
        );
        let best_linear = self.search(&train_df, &y_train, linear_grid())?;
        let (linear_pipeline, linear_f1) =
            self.evaluate(&train_df, &y_train, &test_df, &y_test, best_linear)?;

        info!("Running grid search for the ensemble family");
        let best_ensemble = self.search(&train_df, &y_train, ensemble_grid())?;
        let (ensemble_pipeline, ensemble_f1) =
            self.evaluate(&train_df, &y_train, &test_df, &y_test, best_ensemble)?;

        info!(linear_f1, ensemble_f1, "Held-out evaluation complete");

        // The ensemble must strictly beat the linear family; exact ties go
        // to the linear family.
        let (pipeline, test_f1) = if ensemble_f1 > linear_f1 {
            (ensemble_pipeline, ensemble_f1)
        } else {
            (linear_pipeline, linear_f1)
        };
        let model_name = pipeline.model.name().to_string();

        Ok(TrainingOutcome {
            pipeline,
            model_name,
            test_f1,
            linear_f1,
            ensemble_f1,
        })
    }

    /// Pick the candidate with the best mean cross-validated F1.
    ///
    /// Candidates fan out over rayon; the winner is still deterministic
    /// because scores are compared in grid order (first best wins).
    fn search(&self, df: &DataFrame, y: &Array1<f64>, candidates: Vec<Candidate>) -> Result<Candidate> {
        let scores: Vec<f64> = candidates
            .par_iter()
            .map(|candidate| self.cross_val_f1(df, y, candidate))
            .collect::<Result<Vec<_>>>()?;

        let mut best_idx = 0;
        for (idx, &score) in scores.iter().enumerate() {
            debug!(candidate = %candidates[idx].label(), cv_f1 = score, "Candidate scored");
            if score > scores[best_idx] {
                best_idx = idx;
            }
        }

        info!(
            candidate = %candidates[best_idx].label(),
            cv_f1 = scores[best_idx],
            "Best configuration selected"
        );
        Ok(candidates[best_idx])
    }

    /// Mean F1 over stratified folds. The preprocessor is re-fit inside each
    /// fold so no statistic leaks from validation rows.
    fn cross_val_f1(&self, df: &DataFrame, y: &Array1<f64>, candidate: &Candidate) -> Result<f64> {
        let splits = stratified_k_fold(y, self.config.cv_folds, self.config.seed)?;
        let mut total = 0.0;

        for split in &splits {
            let fold_train = take_rows(df, &split.train_indices)?;
            let fold_val = take_rows(df, &split.test_indices)?;
            let y_fold_train =
                Array1::from_vec(split.train_indices.iter().map(|&i| y[i]).collect());
            let y_fold_val = Array1::from_vec(split.test_indices.iter().map(|&i| y[i]).collect());

            let mut preprocessor = TabularPreprocessor::new();
            let x_train = preprocessor.fit_transform(&fold_train)?;
            let x_val = preprocessor.transform(&fold_val)?;

            let mut model = candidate.build(self.config.seed);
            model.fit(&x_train, &y_fold_train)?;
            let y_pred = model.predict(&x_val)?;

            total += f1_score(&y_fold_val, &y_pred);
        }

        Ok(total / splits.len() as f64)
    }

    /// Refit a candidate on the full training split and score it once on the
    /// held-out test split.
    fn evaluate(
        &self,
        train_df: &DataFrame,
        y_train: &Array1<f64>,
        test_df: &DataFrame,
        y_test: &Array1<f64>,
        candidate: Candidate,
    ) -> Result<(FittedPipeline, f64)> {
        let mut preprocessor = TabularPreprocessor::new();
        let x_train = preprocessor.fit_transform(train_df)?;
        let x_test = preprocessor.transform(test_df)?;

        let mut model = candidate.build(self.config.seed);
        model.fit(&x_train, y_train)?;

        let y_pred = model.predict(&x_test)?;
        let f1 = f1_score(y_test, &y_pred);

        Ok((
            FittedPipeline {
                preprocessor,
                model,
            },
            f1,
        ))
    }
}

/// Materialize a row subset of a DataFrame.
fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}
