//! Error Handling Module
//!
//! Defines the error type used while configuring the service and loading
//! model artifacts. Request-time failures use `inference::InferenceError`.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for startup and artifact operations
#[derive(Error, Debug)]
pub enum AgriError {
    /// An artifact file could not be read or deserialized
    #[error("Failed to load artifact at '{0}': {1}")]
    Artifact(PathBuf, String),

    /// Artifact contents are inconsistent with each other
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AgriError {
    fn from(err: serde_json::Error) -> Self {
        AgriError::Serialization(err.to_string())
    }
}

/// Convenience Result type for startup operations
pub type Result<T> = std::result::Result<T, AgriError>;

/// Extension trait for attaching an artifact path to an error
pub trait ResultExt<T> {
    /// Wrap the error as an artifact failure for `path`
    fn artifact(self, path: &Path) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn artifact(self, path: &Path) -> Result<T> {
        self.map_err(|e| AgriError::Artifact(path.to_path_buf(), e.to_string()))
    }
}
