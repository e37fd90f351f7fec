//! Request-time error taxonomy
//!
//! Every failure of a prediction request ends up as one of these variants.
//! The message is what the client sees in `{"error": ...}`.

use thiserror::Error;

use crate::model::artifacts::TransformError;
use crate::model::classifier::ClassifierError;

/// Failure while serving a prediction request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Request body is missing a field or is malformed
    #[error("{0}")]
    Validation(String),

    /// A value could not be used as model input
    #[error("Value error: {0}")]
    InvalidValue(String),

    /// The fitted one-hot encoder rejected the input
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// The fitted scaler rejected the encoded row
    #[error("Scaling failed: {0}")]
    Scaling(String),

    /// Uploaded bytes are not a decodable image
    #[error("Failed to decode the image.")]
    Decode(String),

    /// The classifier or label decoder rejected the scaled row
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// System-side failure
    #[error("{0}")]
    Internal(String),
}

impl InferenceError {
    /// Body field absent from the request
    pub fn missing_key(detail: impl std::fmt::Display) -> Self {
        InferenceError::Validation(format!("Missing key in input data: {}", detail))
    }

    /// A loaded model could not be run
    pub fn model_unusable(detail: impl std::fmt::Display) -> Self {
        InferenceError::Internal(format!(
            "Attribute error: {}. Ensure model and scalar are properly loaded.",
            detail
        ))
    }

    /// Anything not covered by a more specific variant
    pub fn unexpected(detail: impl std::fmt::Display) -> Self {
        InferenceError::Internal(format!("An unexpected error occurred: {}", detail))
    }

    /// True for failures caused by the system rather than the request
    pub fn is_internal(&self) -> bool {
        matches!(self, InferenceError::Internal(_))
    }

    /// Underlying detail, including the decoder's reason for `Decode`
    pub fn detail(&self) -> String {
        match self {
            InferenceError::Decode(reason) => format!("Failed to decode the image: {}", reason),
            other => other.to_string(),
        }
    }
}

impl From<TransformError> for InferenceError {
    fn from(err: TransformError) -> Self {
        InferenceError::InvalidValue(err.to_string())
    }
}

impl From<ClassifierError> for InferenceError {
    fn from(err: ClassifierError) -> Self {
        InferenceError::model_unusable(err)
    }
}
