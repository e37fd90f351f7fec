//! HTTP route handlers

pub mod crop;
pub mod fertilizer;
pub mod health;
pub mod root;
pub mod soil;

use axum::extract::rejection::JsonRejection;

use crate::inference::InferenceError;

/// Classify a JSON body rejection. Absent fields read as missing keys,
/// unparseable values as value errors.
pub(crate) fn json_rejection(rejection: JsonRejection) -> InferenceError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let text = err.body_text();
            if text.contains("missing field") {
                InferenceError::missing_key(text)
            } else {
                InferenceError::InvalidValue(text)
            }
        }
        other => InferenceError::Validation(other.body_text()),
    }
}

/// Run one synchronous model call on the blocking pool
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, InferenceError>
where
    F: FnOnce() -> Result<T, InferenceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(InferenceError::unexpected)?
}
