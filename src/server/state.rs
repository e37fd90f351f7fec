//! Application state shared by every handler

use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::inference::InferenceError;
use crate::model::registry::ModelRegistry;
use crate::server::error::ApiError;

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Every loaded model artifact, read-only
    pub registry: ModelRegistry,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, registry: ModelRegistry) -> Self {
        Self {
            config,
            registry,
            started_at: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Wrap a request failure for rendering, honouring redaction
    pub fn api_error(&self, error: InferenceError) -> ApiError {
        ApiError::new(error, self.config.redact_internal_errors)
    }
}

pub type SharedState = Arc<AppState>;
