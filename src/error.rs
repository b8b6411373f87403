//! Error types for predictor generation, training and prediction

use thiserror::Error;

/// Result type alias for predictor operations
pub type Result<T> = std::result::Result<T, PredictorError>;

/// Main error type for the predictor factory
#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("'{0}' not implemented")]
    NotImplemented(String),

    #[error("Range specification is missing required key '{0}'")]
    MissingRangeBound(&'static str),

    #[error("Cannot expand config parameter: {0}")]
    UnsupportedSpec(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PredictorError {
    /// Whether this error stems from a malformed configuration rather than
    /// from an engine or I/O failure.
    pub fn is_specification_error(&self) -> bool {
        matches!(
            self,
            PredictorError::NotImplemented(_)
                | PredictorError::MissingRangeBound(_)
                | PredictorError::UnsupportedSpec(_)
                | PredictorError::InvalidParameter { .. }
                | PredictorError::Config(_)
        )
    }
}

impl From<serde_json::Error> for PredictorError {
    fn from(err: serde_json::Error) -> Self {
        PredictorError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PredictorError {
    fn from(err: ndarray::ShapeError) -> Self {
        PredictorError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
