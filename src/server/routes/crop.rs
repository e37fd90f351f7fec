//! Crop recommendation endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::inference::{predict_crop, CropPrediction, CropQuery};
use crate::server::error::ApiError;
use crate::server::routes::{json_rejection, run_blocking};
use crate::server::state::SharedState;

/// POST /prediction - Top-4 crops for soil and climate readings
pub async fn predict(
    State(state): State<SharedState>,
    payload: Result<Json<CropQuery>, JsonRejection>,
) -> Result<Json<CropPrediction>, ApiError> {
    let Json(query) = payload.map_err(|r| state.api_error(json_rejection(r)))?;

    let worker = state.clone();
    let prediction = run_blocking(move || predict_crop(worker.registry.crop(), &query))
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(prediction))
}
