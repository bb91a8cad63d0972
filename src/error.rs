//! Error types for the tabmlp crate

use thiserror::Error;

/// Result type alias for tabmlp operations
pub type Result<T> = std::result::Result<T, TabMlpError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum TabMlpError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Missing hyperparameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Label {label} outside the {n_classes}-class label space")]
    LabelOutOfRange { label: i64, n_classes: usize },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Missing artifact: {0}")]
    ArtifactMissing(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TabMlpError {
    fn from(err: serde_json::Error) -> Self {
        TabMlpError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for TabMlpError {
    fn from(err: ndarray::ShapeError) -> Self {
        TabMlpError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for TabMlpError {
    fn from(err: polars::error::PolarsError) -> Self {
        TabMlpError::DataError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TabMlpError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TabMlpError = io_err.into();
        assert!(matches!(err, TabMlpError::IoError(_)));
    }

    #[test]
    fn test_missing_parameter_display() {
        let err = TabMlpError::MissingParameter("units".to_string());
        assert_eq!(err.to_string(), "Missing hyperparameter: units");
    }
}
