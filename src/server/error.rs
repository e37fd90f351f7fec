//! Rendering of request failures as `{"error": ...}` responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::inference::{ErrorBody, InferenceError};

/// Message sent instead of internal error text when redaction is enabled
pub const REDACTED_MESSAGE: &str = "Internal server error";

/// A failed request, ready to become an HTTP response
#[derive(Debug)]
pub struct ApiError {
    error: InferenceError,
    redact: bool,
}

impl ApiError {
    pub fn new(error: InferenceError, redact: bool) -> Self {
        Self { error, redact }
    }

    pub fn status(&self) -> StatusCode {
        status_code(&self.error)
    }
}

/// 500 for system-side failures, 400 for everything the request caused
pub fn status_code(error: &InferenceError) -> StatusCode {
    if error.is_internal() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if self.error.is_internal() {
            error!("Request failed: {}", self.error.detail());
            if self.redact {
                REDACTED_MESSAGE.to_string()
            } else {
                self.error.to_string()
            }
        } else {
            warn!("Rejected request: {}", self.error.detail());
            self.error.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
