//! Soil classification: uploaded photo → single soil label

use tracing::debug;

use crate::inference::error::InferenceError;
use crate::inference::types::SoilPrediction;
use crate::model::classifier::argmax;
use crate::model::registry::SoilModels;
use crate::preprocess::image::{decode_image, ImagePreprocessor};

/// Classify the soil shown in an encoded image
pub fn classify_soil(models: &SoilModels, bytes: &[u8]) -> Result<SoilPrediction, InferenceError> {
    let image = decode_image(bytes).map_err(|e| InferenceError::Decode(e.to_string()))?;

    // Input side comes from the classifier's fixed [1, H, W, 3] shape
    let side = models.classifier.input_shape().get(1).copied().unwrap_or(224);
    let tensor = ImagePreprocessor::new()
        .with_image_size(side as u32)
        .preprocess(&image)
        .map_err(InferenceError::unexpected)?;

    let probabilities = models.classifier.predict_proba(tensor.into_dyn())?;
    if probabilities.nrows() == 0 {
        return Err(InferenceError::model_unusable("classifier returned no rows"));
    }
    let row = probabilities.row(0).to_vec();
    let idx = argmax(&row).ok_or_else(|| InferenceError::model_unusable("classifier returned no scores"))?;

    let soil = models
        .labels
        .inverse_transform(idx)
        .map_err(InferenceError::unexpected)?
        .to_string();

    debug!("Soil classification: {} ({}x{} upload)", soil, image.width(), image.height());

    Ok(SoilPrediction { soil })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::testing::FixedClassifier;
    use crate::model::artifacts::LabelEncoder;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn models(scores: Vec<f32>) -> SoilModels {
        SoilModels {
            classifier: Box::new(FixedClassifier::new(vec![1, 224, 224, 3], scores)),
            labels: LabelEncoder::new(["Alluvial soil", "Black Soil", "Clay soil", "Red soil"]),
        }
    }

    fn jpeg() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([120, 60, 30])));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Jpeg).unwrap();
        bytes
    }

    #[test]
    fn test_classify_soil_picks_argmax() {
        let prediction = classify_soil(&models(vec![0.1, 0.2, 0.1, 0.6]), &jpeg()).unwrap();
        assert_eq!(prediction.soil, "Red soil");
    }

    #[test]
    fn test_classify_soil_tie_takes_first() {
        let prediction = classify_soil(&models(vec![0.4, 0.4, 0.1, 0.1]), &jpeg()).unwrap();
        assert_eq!(prediction.soil, "Alluvial soil");
    }

    #[test]
    fn test_classify_soil_no_rows_is_internal() {
        let mut models = models(vec![]);
        models.classifier = Box::new(FixedClassifier::empty(vec![1, 224, 224, 3], 4));
        let err = classify_soil(&models, &jpeg()).unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn test_classify_soil_rejects_text() {
        let err = classify_soil(&models(vec![1.0, 0.0, 0.0, 0.0]), b"soil.jpg but plain text").unwrap_err();
        assert!(matches!(err, InferenceError::Decode(_)));
        assert_eq!(err.to_string(), "Failed to decode the image.");
    }

    #[test]
    fn test_classify_soil_empty_upload() {
        let err = classify_soil(&models(vec![1.0, 0.0, 0.0, 0.0]), &[]).unwrap_err();
        assert!(matches!(err, InferenceError::Decode(_)));
    }
}
