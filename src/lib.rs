//! # Agri Inference
//!
//! HTTP inference service for three pre-trained agricultural models, plus a
//! client for calling it.
//!
//! ## Modules
//!
//! - `model`: artifact loading, the `Classifier` capability and the registry
//! - `preprocess`: image tensors and tabular feature encoding
//! - `inference`: the crop, soil and fertilizer request pipelines
//! - `server`: axum router, handlers and error rendering
//! - `client`: HTTP client used by the CLI subcommands
//! - `config`: server configuration and artifact locations
//! - `utils`: error types and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agri_inference::{config::ServerConfig, model::ModelRegistry, server};
//!
//! let config = ServerConfig::default();
//! let registry = ModelRegistry::load(&config.artifact_paths())?;
//! server::serve(config, registry).await?;
//! ```

pub mod client;
pub mod config;
pub mod inference;
pub mod model;
pub mod preprocess;
pub mod server;
pub mod utils;

// Re-export commonly used items for convenience
pub use client::{AgriClient, ClientError};
pub use config::{ArtifactPaths, ServerConfig};
pub use inference::{
    CropPrediction, CropQuery, FertilizerPrediction, FertilizerQuery, InferenceError, SoilPrediction,
};
pub use model::{Classifier, ModelRegistry, Task};
pub use utils::error::{AgriError, Result};
