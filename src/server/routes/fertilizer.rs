//! Fertilizer recommendation endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::inference::{recommend_fertilizer, FertilizerPrediction, FertilizerQuery};
use crate::server::error::ApiError;
use crate::server::routes::{json_rejection, run_blocking};
use crate::server::state::SharedState;

/// POST /fertilizerReccommendation - Fertilizer for field conditions
pub async fn recommend(
    State(state): State<SharedState>,
    payload: Result<Json<FertilizerQuery>, JsonRejection>,
) -> Result<Json<FertilizerPrediction>, ApiError> {
    let Json(query) = payload.map_err(|r| state.api_error(json_rejection(r)))?;

    let worker = state.clone();
    let prediction = run_blocking(move || recommend_fertilizer(worker.registry.fertilizer(), &query))
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(prediction))
}
