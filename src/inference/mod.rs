//! Single-row inference over a loaded artifact bundle

mod engine;

pub use engine::{FeatureRow, FeatureValue, InferenceEngine, PredictionResult};
