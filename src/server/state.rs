//! Application state shared across handlers
//!
//! The bundle is loaded exactly once at startup and injected here; it is
//! immutable for the process lifetime, so handlers share it without locks.

use crate::bundle::ArtifactBundle;
use crate::inference::InferenceEngine;
use std::sync::Arc;

pub struct AppState {
    pub bundle: Arc<ArtifactBundle>,
    pub engine: InferenceEngine,
}

impl AppState {
    pub fn new(bundle: ArtifactBundle) -> Self {
        let bundle = Arc::new(bundle);
        let engine = InferenceEngine::new(bundle.clone());
        Self { bundle, engine }
    }
}
