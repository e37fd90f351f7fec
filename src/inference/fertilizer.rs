//! Fertilizer recommendation
//!
//! Runs in three reported stages so clients can tell which one failed:
//! one-hot encoding, scaling, then prediction and label decoding.

use tracing::debug;

use crate::inference::error::InferenceError;
use crate::inference::types::{FertilizerPrediction, FertilizerQuery};
use crate::model::classifier::argmax;
use crate::model::registry::FertilizerModels;
use crate::preprocess::tabular::{encode_fertilizer, scale_fertilizer};

/// Recommend a fertilizer for the given field conditions
pub fn recommend_fertilizer(
    models: &FertilizerModels,
    query: &FertilizerQuery,
) -> Result<FertilizerPrediction, InferenceError> {
    query.validate()?;

    let encoded =
        encode_fertilizer(query, &models.encoder).map_err(|e| InferenceError::Encoding(e.to_string()))?;

    let scaled = scale_fertilizer(&encoded, &models.scaler).map_err(|e| InferenceError::Scaling(e.to_string()))?;

    let probabilities = models
        .classifier
        .predict_proba(scaled.mapv(|v| v as f32).into_dyn())
        .map_err(|e| InferenceError::Prediction(e.to_string()))?;
    if probabilities.nrows() == 0 {
        return Err(InferenceError::Prediction("classifier returned no rows".to_string()));
    }
    let row = probabilities.row(0).to_vec();
    let idx = argmax(&row).ok_or_else(|| InferenceError::Prediction("classifier returned no scores".to_string()))?;

    let prediction = models
        .labels
        .inverse_transform(idx)
        .map_err(|e| InferenceError::Prediction(e.to_string()))?
        .to_string();

    debug!(
        "Fertilizer recommendation for {} / {}: {}",
        query.soil_type, query.crop_type, prediction
    );

    Ok(FertilizerPrediction { prediction })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::testing::FixedClassifier;
    use crate::model::artifacts::{LabelEncoder, OneHotEncoder, Scaler};

    fn query(soil: &str) -> FertilizerQuery {
        FertilizerQuery {
            temparature: 26.0,
            humidity: 52.0,
            moisture: 38.0,
            soil_type: soil.to_string(),
            crop_type: "Maize".to_string(),
            nitrogen: 37.0,
            potassium: 0.0,
            phosphorous: 0.0,
        }
    }

    fn models() -> FertilizerModels {
        let encoder = OneHotEncoder::new(
            vec!["Soil Type".to_string(), "Crop Type".to_string()],
            vec![
                vec!["Black".to_string(), "Clayey".to_string(), "Sandy".to_string()],
                vec!["Maize".to_string(), "Wheat".to_string()],
            ],
        );
        FertilizerModels {
            scaler: Scaler::min_max(vec![0.0; 11], vec![0.01; 11]),
            classifier: Box::new(FixedClassifier::new(vec![1, 11], vec![0.1, 0.7, 0.2])),
            labels: LabelEncoder::new(["10-26-26", "Urea", "DAP"]),
            encoder,
        }
    }

    #[test]
    fn test_recommend_fertilizer() {
        let prediction = recommend_fertilizer(&models(), &query("Sandy")).unwrap();
        assert_eq!(prediction.prediction, "Urea");
    }

    #[test]
    fn test_unknown_soil_is_encoding_error() {
        let err = recommend_fertilizer(&models(), &query("Unknown")).unwrap_err();
        assert!(matches!(err, InferenceError::Encoding(_)));
        assert!(err.to_string().starts_with("Encoding failed:"));
        assert!(err.to_string().contains("Unknown"));
    }

    #[test]
    fn test_scaler_width_mismatch_is_scaling_error() {
        let mut models = models();
        models.scaler = Scaler::min_max(vec![0.0; 13], vec![1.0; 13]);
        let err = recommend_fertilizer(&models, &query("Black")).unwrap_err();
        assert!(err.to_string().starts_with("Scaling failed:"));
    }

    #[test]
    fn test_classifier_failure_is_prediction_error() {
        let mut models = models();
        models.classifier = Box::new(FixedClassifier::new(vec![1, 12], vec![1.0]));
        let err = recommend_fertilizer(&models, &query("Clayey")).unwrap_err();
        assert!(matches!(err, InferenceError::Prediction(_)));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_no_rows_is_prediction_error() {
        let mut models = models();
        models.classifier = Box::new(FixedClassifier::empty(vec![1, 11], 3));
        let err = recommend_fertilizer(&models, &query("Sandy")).unwrap_err();
        assert!(matches!(err, InferenceError::Prediction(ref msg) if msg.contains("no rows")));
    }

    #[test]
    fn test_label_out_of_range_is_prediction_error() {
        let mut models = models();
        models.classifier = Box::new(FixedClassifier::new(vec![1, 11], vec![0.0, 0.0, 0.0, 1.0]));
        let err = recommend_fertilizer(&models, &query("Black")).unwrap_err();
        assert!(matches!(err, InferenceError::Prediction(_)));
    }
}
