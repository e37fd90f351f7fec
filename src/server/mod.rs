//! HTTP Server
//!
//! Axum router over a single immutable `ModelRegistry`. Each prediction
//! request runs exactly one model call on the blocking pool; there is no
//! batching or caching.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::model::registry::ModelRegistry;
use crate::utils::error::Result;

pub use error::ApiError;
pub use state::{AppState, SharedState};

/// Build the router for the given state
pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(routes::root::welcome))
        .route("/health", get(routes::health::health_check))
        .route("/prediction", post(routes::crop::predict))
        .route("/soil_classification", post(routes::soil::classify))
        .route("/fertilizerReccommendation", post(routes::fertilizer::recommend))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: ServerConfig, registry: ModelRegistry) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::new(config, registry));
    let app = router(state);

    info!("Starting server on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
