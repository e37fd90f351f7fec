//! Crop recommendation: scaled soil/climate row → top-4 ranked crops

use tracing::debug;

use crate::inference::error::InferenceError;
use crate::inference::types::{top_k, ClassProbability, CropPrediction, CropQuery};
use crate::model::registry::CropModels;
use crate::preprocess::tabular::encode_crop;

/// Number of ranked candidates returned
pub const TOP_K: usize = 4;

/// Widen an `f32` score to the `f64` with the same shortest decimal form,
/// so `0.45f32` is reported as `0.45` rather than `0.44999998807907104`
fn decimal_f64(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(value as f64)
}

/// Rank the most suitable crops for a query
pub fn predict_crop(models: &CropModels, query: &CropQuery) -> Result<CropPrediction, InferenceError> {
    query.validate()?;

    let scaled = encode_crop(query, &models.scaler)?;
    let input = scaled.mapv(|v| v as f32).into_dyn();

    let probabilities = models.classifier.predict_proba(input)?;
    if probabilities.nrows() == 0 {
        return Err(InferenceError::model_unusable("classifier returned no rows"));
    }
    let row = probabilities.row(0).to_vec();

    let top_prediction = top_k(&row, TOP_K)
        .into_iter()
        .map(|idx| -> Result<ClassProbability, InferenceError> {
            let class = models
                .labels
                .inverse_transform(idx)
                .map_err(InferenceError::unexpected)?;
            Ok(ClassProbability {
                class: class.to_string(),
                probability: decimal_f64(row[idx]),
            })
        })
        .collect::<Result<Vec<_>, InferenceError>>()?;

    debug!(
        "Crop prediction: {:?}",
        top_prediction.iter().map(|p| p.class.as_str()).collect::<Vec<_>>()
    );

    Ok(CropPrediction { top_prediction })
}
