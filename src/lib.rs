//! IncomeLens - income classification pipeline
//!
//! Trains a binary tabular classifier (income ≤50K vs >50K) from a CSV
//! dataset, selects the best of two model families by cross-validated F1,
//! persists a reusable prediction bundle, and serves single-row predictions
//! with a probability threshold and a top-factor explanation.
//!
//! # Modules
//!
//! ## Core pipeline
//! - [`data`] - CSV loading, string cleaning, target extraction
//! - [`preprocessing`] - Schema inference, imputation, one-hot encoding
//! - [`training`] - Both model families, grid search, selection protocol
//! - [`explain`] - Top-factor extraction from the fitted winner
//!
//! ## Persistence & serving
//! - [`bundle`] - Artifact pair (model + metadata) save/load
//! - [`inference`] - Single-row prediction over a loaded bundle
//! - [`server`] - HTTP shell (`/health`, `/schema`, `/predict`)
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core pipeline
pub mod data;
pub mod preprocessing;
pub mod training;
pub mod explain;

// Persistence & serving
pub mod bundle;
pub mod inference;
pub mod server;
pub mod cli;

pub use error::{IncomeLensError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{IncomeLensError, Result};

    pub use crate::data::{clean_strings, load_csv, split_target};

    pub use crate::preprocessing::{ColumnType, FeatureSchema, TabularPreprocessor};

    pub use crate::training::{
        ClassifierFamily, FittedPipeline, LogisticRegression, RandomForest, TrainEngine,
        TrainingConfig, TrainingOutcome,
    };

    pub use crate::explain::{top_factors, TopFactor, SERVING_TOP_K, TRAINING_TOP_K};

    pub use crate::bundle::{ArtifactBundle, Metadata};

    pub use crate::inference::{FeatureRow, FeatureValue, InferenceEngine, PredictionResult};

    pub use crate::server::{run_server, AppState, ServerConfig};
}
