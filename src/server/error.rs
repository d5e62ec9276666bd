//! Error types for the serving shell

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// No artifact bundle is loaded; train first and restart.
    #[error("Service not ready: {0}")]
    NotReady(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::NotReady(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<crate::error::IncomeLensError> for ServerError {
    fn from(err: crate::error::IncomeLensError) -> Self {
        use crate::error::IncomeLensError;
        match err {
            IncomeLensError::ModelNotFitted => {
                ServerError::NotReady("Model not loaded. Train the model first.".to_string())
            }
            IncomeLensError::InvalidInput(msg) => {
                ServerError::BadRequest(format!("Prediction failed: {}", msg))
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
