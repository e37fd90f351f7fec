//! Soil classification endpoint

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

use crate::inference::{classify_soil, InferenceError, SoilPrediction};
use crate::server::error::ApiError;
use crate::server::routes::run_blocking;
use crate::server::state::SharedState;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// Bytes of the `file` field; other fields are skipped
async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, InferenceError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        InferenceError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() == Some(FILE_FIELD) {
            return field.bytes().await.map_err(invalid);
        }
    }

    Err(InferenceError::missing_key(format!("'{}'", FILE_FIELD)))
}

/// POST /soil_classification - Soil type from an uploaded photo
pub async fn classify(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SoilPrediction>, ApiError> {
    let mut multipart =
        multipart.map_err(|r| state.api_error(InferenceError::Validation(r.body_text())))?;

    let bytes = read_file_field(&mut multipart)
        .await
        .map_err(|e| state.api_error(e))?;

    let worker = state.clone();
    let prediction = run_blocking(move || classify_soil(worker.registry.soil(), &bytes))
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(prediction))
}
