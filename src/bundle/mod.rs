//! Artifact bundle: the persistence boundary between training and serving
//!
//! A training run produces two co-located files — the serialized fitted
//! pipeline and a JSON metadata record. The serving process loads both as a
//! unit at startup; if either is missing, the bundle reports `loaded=false`
//! and every accessor falls back to a safe default. A file that exists but
//! cannot be parsed is a genuine error, never silently skipped.

use crate::error::{IncomeLensError, Result};
use crate::explain::TopFactor;
use crate::training::FittedPipeline;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the serialized fitted pipeline
pub const MODEL_FILE: &str = "model.json";
/// File name of the metadata record
pub const METADATA_FILE: &str = "metadata.json";

const DEFAULT_TARGET: &str = "income";
const DEFAULT_POSITIVE_LABEL: &str = ">50K";
const DEFAULT_NEGATIVE_LABEL: &str = "<=50K";
const DEFAULT_THRESHOLD: f64 = 0.5;
const DEFAULT_MODEL_NAME: &str = "unknown-model";

/// Metadata record written once per training run; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub project: String,
    pub model_name: String,
    pub test_f1: f64,
    pub target_column: String,
    pub positive_label: String,
    pub threshold: f64,
    pub expected_features: Vec<String>,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub label_mapping: BTreeMap<String, String>,
    pub top_factors: Vec<TopFactor>,
    pub trained_at: String,
}

impl Metadata {
    /// The canonical label mapping for a positive label text.
    pub fn label_mapping_for(positive_label: &str) -> BTreeMap<String, String> {
        let mut mapping = BTreeMap::new();
        mapping.insert("0".to_string(), DEFAULT_NEGATIVE_LABEL.to_string());
        mapping.insert("1".to_string(), positive_label.to_string());
        mapping
    }
}

/// The paired fitted pipeline + metadata loaded by the serving process.
#[derive(Debug)]
pub struct ArtifactBundle {
    dir: PathBuf,
    pipeline: Option<FittedPipeline>,
    meta: Option<Metadata>,
    loaded: bool,
}

impl ArtifactBundle {
    /// Create an empty (not yet loaded) bundle rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pipeline: None,
            meta: None,
            loaded: false,
        }
    }

    /// Write both artifacts for a freshly trained pipeline.
    ///
    /// Creates the directory if absent. The model is written before the
    /// metadata; a crash in between leaves a pair the next `load` rejects
    /// loudly instead of treating as valid.
    pub fn save(dir: &Path, pipeline: &FittedPipeline, meta: &Metadata) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir)?;

        let model_path = dir.join(MODEL_FILE);
        let meta_path = dir.join(METADATA_FILE);

        let model_json = serde_json::to_string(pipeline)?;
        std::fs::write(&model_path, model_json)?;

        let meta_json = serde_json::to_string_pretty(meta)?;
        std::fs::write(&meta_path, meta_json)?;

        info!(
            model = %model_path.display(),
            metadata = %meta_path.display(),
            "Artifacts written"
        );

        Ok((model_path, meta_path))
    }

    /// Load both artifacts as a unit.
    ///
    /// Either file missing is the normal "not trained yet" case: the bundle
    /// stays unloaded and this returns Ok. A file that exists but fails to
    /// parse is a real error.
    pub fn load(&mut self) -> Result<()> {
        let model_path = self.dir.join(MODEL_FILE);
        let meta_path = self.dir.join(METADATA_FILE);

        if !model_path.exists() || !meta_path.exists() {
            self.pipeline = None;
            self.meta = None;
            self.loaded = false;
            info!(dir = %self.dir.display(), "No artifact pair found; bundle not loaded");
            return Ok(());
        }

        let model_json = std::fs::read_to_string(&model_path)?;
        let pipeline: FittedPipeline = serde_json::from_str(&model_json).map_err(|e| {
            IncomeLensError::SerializationError(format!(
                "corrupt model artifact {}: {}",
                model_path.display(),
                e
            ))
        })?;

        let meta_json = std::fs::read_to_string(&meta_path)?;
        let meta: Metadata = serde_json::from_str(&meta_json).map_err(|e| {
            IncomeLensError::SerializationError(format!(
                "corrupt metadata artifact {}: {}",
                meta_path.display(),
                e
            ))
        })?;

        info!(
            model_name = %meta.model_name,
            features = meta.expected_features.len(),
            "Artifact bundle loaded"
        );

        self.pipeline = Some(pipeline);
        self.meta = Some(meta);
        self.loaded = true;
        Ok(())
    }

    /// Convenience constructor: create and load in one step.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let mut bundle = Self::new(dir);
        bundle.load()?;
        Ok(bundle)
    }

    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn pipeline(&self) -> Option<&FittedPipeline> {
        self.pipeline.as_ref()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.meta.as_ref()
    }

    /// Expected feature order; empty when no bundle is loaded.
    pub fn expected_features(&self) -> Vec<String> {
        self.meta
            .as_ref()
            .map(|m| m.expected_features.clone())
            .unwrap_or_default()
    }

    pub fn target_column(&self) -> String {
        self.meta
            .as_ref()
            .map(|m| m.target_column.clone())
            .unwrap_or_else(|| DEFAULT_TARGET.to_string())
    }

    pub fn positive_label(&self) -> String {
        self.meta
            .as_ref()
            .map(|m| m.positive_label.clone())
            .unwrap_or_else(|| DEFAULT_POSITIVE_LABEL.to_string())
    }

    pub fn threshold(&self) -> f64 {
        self.meta.as_ref().map(|m| m.threshold).unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn model_name(&self) -> String {
        self.meta
            .as_ref()
            .map(|m| m.model_name.clone())
            .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string())
    }

    pub fn label_mapping(&self) -> BTreeMap<String, String> {
        self.meta
            .as_ref()
            .map(|m| m.label_mapping.clone())
            .unwrap_or_else(|| Metadata::label_mapping_for(DEFAULT_POSITIVE_LABEL))
    }

    /// Top factors captured at training; empty when none were.
    pub fn top_factors(&self) -> Vec<TopFactor> {
        self.meta
            .as_ref()
            .map(|m| m.top_factors.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unloaded_bundle_defaults() {
        let bundle = ArtifactBundle::new("/nonexistent/artifacts");
        assert!(!bundle.loaded());
        assert!(bundle.expected_features().is_empty());
        assert_eq!(bundle.target_column(), "income");
        assert_eq!(bundle.positive_label(), ">50K");
        assert_eq!(bundle.threshold(), 0.5);
        assert_eq!(bundle.model_name(), "unknown-model");

        let mapping = bundle.label_mapping();
        assert_eq!(mapping.get("0").map(String::as_str), Some("<=50K"));
        assert_eq!(mapping.get("1").map(String::as_str), Some(">50K"));
    }

    #[test]
    fn test_load_missing_dir_is_not_an_error() {
        let mut bundle = ArtifactBundle::new("/nonexistent/artifacts");
        assert!(bundle.load().is_ok());
        assert!(!bundle.loaded());
    }

    #[test]
    fn test_label_mapping_for_positive_label() {
        let mapping = Metadata::label_mapping_for(">100K");
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("1").map(String::as_str), Some(">100K"));
    }
}
