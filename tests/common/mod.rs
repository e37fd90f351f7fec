//! Shared fixtures: a registry of stub classifiers with realistic artifacts

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agri_inference::config::ServerConfig;
use agri_inference::model::{
    Classifier, ClassifierError, CropModels, FertilizerModels, LabelEncoder, ModelRegistry, OneHotEncoder, Scaler,
    SoilModels,
};
use agri_inference::preprocess::CROP_FEATURE_COLUMNS;
use agri_inference::server::{self, AppState};
use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::{Array2, ArrayD};

pub const CROP_LABELS: [&str; 6] = ["chickpea", "cotton", "jute", "maize", "rice", "banana"];
pub const CROP_PROBABILITIES: [f32; 6] = [0.05, 0.1, 0.3, 0.05, 0.45, 0.05];

pub const SOIL_LABELS: [&str; 4] = ["Alluvial soil", "Black Soil", "Clay soil", "Red soil"];

pub const FERTILIZER_LABELS: [&str; 7] = ["10-26-26", "14-35-14", "17-17-17", "20-20", "28-28", "DAP", "Urea"];
pub const FERTILIZER_SOILS: [&str; 5] = ["Black", "Clayey", "Loamy", "Red", "Sandy"];
pub const FERTILIZER_CROPS: [&str; 11] = [
    "Barley",
    "Cotton",
    "Ground Nuts",
    "Maize",
    "Millets",
    "Oil seeds",
    "Paddy",
    "Pulses",
    "Sugarcane",
    "Tobacco",
    "Wheat",
];

/// Returns the same probability row for every correctly shaped input
pub struct StubClassifier {
    shape: Vec<usize>,
    row: Vec<f32>,
}

impl StubClassifier {
    pub fn new(shape: &[usize], row: &[f32]) -> Self {
        Self {
            shape: shape.to_vec(),
            row: row.to_vec(),
        }
    }
}

impl Classifier for StubClassifier {
    fn input_shape(&self) -> &[usize] {
        &self.shape
    }

    fn predict_proba(&self, input: ArrayD<f32>) -> Result<Array2<f32>, ClassifierError> {
        if input.shape() != self.shape.as_slice() {
            return Err(ClassifierError::InputShape {
                expected: self.shape.clone(),
                actual: input.shape().to_vec(),
            });
        }
        Array2::from_shape_vec((1, self.row.len()), self.row.clone()).map_err(|e| ClassifierError::Output(e.to_string()))
    }
}

/// Passes the load-time zero-input check, then fails every request
pub struct BrokenClassifier {
    inner: StubClassifier,
    calls: AtomicUsize,
}

impl BrokenClassifier {
    pub fn new(shape: &[usize], row: &[f32]) -> Self {
        Self {
            inner: StubClassifier::new(shape, row),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Classifier for BrokenClassifier {
    fn input_shape(&self) -> &[usize] {
        self.inner.input_shape()
    }

    fn predict_proba(&self, input: ArrayD<f32>) -> Result<Array2<f32>, ClassifierError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return self.inner.predict_proba(input);
        }
        Err(ClassifierError::Execution("graph at /srv/models/crop_classifier.onnx is corrupt".to_string()))
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

pub fn crop_models(classifier: Box<dyn Classifier>) -> CropModels {
    CropModels {
        classifier,
        labels: LabelEncoder::new(CROP_LABELS),
        scaler: Scaler::standard(
            vec![50.5, 53.4, 48.1, 25.6, 71.5, 6.5, 103.5],
            vec![36.9, 32.9, 50.6, 5.1, 22.3, 0.8, 54.9],
        )
        .with_feature_names(CROP_FEATURE_COLUMNS),
    }
}

pub fn soil_models() -> SoilModels {
    SoilModels {
        classifier: Box::new(StubClassifier::new(&[1, 224, 224, 3], &[0.1, 0.6, 0.2, 0.1])),
        labels: LabelEncoder::new(SOIL_LABELS),
    }
}

pub fn fertilizer_models() -> FertilizerModels {
    let encoder = OneHotEncoder::new(
        strings(&["Soil Type", "Crop Type"]),
        vec![strings(&FERTILIZER_SOILS), strings(&FERTILIZER_CROPS)],
    );
    let width = 6 + encoder.feature_names_out().len();

    let mut names = strings(&["Temparature", "Humidity ", "Moisture", "Nitrogen", "Potassium", "Phosphorous"]);
    names.extend(encoder.feature_names_out());

    FertilizerModels {
        scaler: Scaler::min_max(vec![-0.1; width], vec![0.02; width]).with_feature_names(names),
        classifier: Box::new(StubClassifier::new(
            &[1, width],
            &[0.02, 0.03, 0.05, 0.1, 0.1, 0.2, 0.5],
        )),
        labels: LabelEncoder::new(FERTILIZER_LABELS),
        encoder,
    }
}

pub fn registry() -> ModelRegistry {
    ModelRegistry::new(
        crop_models(Box::new(StubClassifier::new(&[1, 7], &CROP_PROBABILITIES))),
        soil_models(),
        fertilizer_models(),
    )
    .unwrap()
}

/// Registry whose crop classifier fails at request time
pub fn broken_registry() -> ModelRegistry {
    ModelRegistry::new(
        crop_models(Box::new(BrokenClassifier::new(&[1, 7], &CROP_PROBABILITIES))),
        soil_models(),
        fertilizer_models(),
    )
    .unwrap()
}

pub fn app_with(registry: ModelRegistry, config: ServerConfig) -> Router {
    server::router(Arc::new(AppState::new(config, registry)))
}

pub fn app() -> Router {
    app_with(registry(), ServerConfig::default())
}

pub fn jpeg_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(320, 240, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 40])
    }));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

pub const BOUNDARY: &str = "agri-test-boundary";

/// Multipart body with a single file field
pub fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}
