//! HTTP request handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::inference::{FeatureRow, PredictionResult};

use super::error::{Result, ServerError};
use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Serialize)]
pub struct SchemaResponse {
    pub expected_features: Vec<String>,
    pub target_column: String,
    pub positive_label: String,
    pub label_mapping: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub struct PredictRequest {
    pub features: FeatureRow,
}

/// Liveness + bundle status. Always succeeds.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let loaded = state.bundle.loaded();
    Json(HealthResponse {
        status: "ok".to_string(),
        loaded,
        model: if loaded {
            Some(state.bundle.model_name())
        } else {
            None
        },
    })
}

/// The stored feature schema. Not-ready until a bundle is loaded.
pub async fn schema(State(state): State<Arc<AppState>>) -> Result<Json<SchemaResponse>> {
    if !state.bundle.loaded() {
        return Err(ServerError::NotReady(
            "Model not loaded. Train the model first.".to_string(),
        ));
    }

    Ok(Json(SchemaResponse {
        expected_features: state.bundle.expected_features(),
        target_column: state.bundle.target_column(),
        positive_label: state.bundle.positive_label(),
        label_mapping: state.bundle.label_mapping(),
    }))
}

/// Score a single feature row.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionResult>> {
    if !state.bundle.loaded() {
        return Err(ServerError::NotReady(
            "Model not loaded. Train the model first.".to_string(),
        ));
    }

    let result = state.engine.predict(&request.features)?;

    info!(
        label = %result.label,
        probability = ?result.probability,
        "Prediction served"
    );

    Ok(Json(result))
}
