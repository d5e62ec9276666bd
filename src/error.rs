//! Error types for the IncomeLens pipeline

use thiserror::Error;

/// Result type alias for IncomeLens operations
pub type Result<T> = std::result::Result<T, IncomeLensError>;

/// Main error type for the IncomeLens pipeline
#[derive(Error, Debug)]
pub enum IncomeLensError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for IncomeLensError {
    fn from(err: polars::error::PolarsError) -> Self {
        IncomeLensError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for IncomeLensError {
    fn from(err: serde_json::Error) -> Self {
        IncomeLensError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for IncomeLensError {
    fn from(err: ndarray::ShapeError) -> Self {
        IncomeLensError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IncomeLensError::ConfigError("target column 'income' not found".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: target column 'income' not found"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: IncomeLensError = io_err.into();
        assert!(matches!(err, IncomeLensError::IoError(_)));
    }
}
