//! Request and response bodies for the prediction endpoints

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::inference::error::InferenceError;

/// Deserialize a float from a JSON number or a string holding one
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    struct LenientF64;

    impl<'de> Visitor<'de> for LenientF64 {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or a string containing a number")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::custom(format!("unable to parse string as a number: '{}'", v)))
        }
    }

    deserializer.deserialize_any(LenientF64)
}

/// Reject NaN and infinities, naming the offending field
fn check_finite(fields: &[(&str, f64)]) -> Result<(), InferenceError> {
    match fields.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, v)) => Err(InferenceError::InvalidValue(format!(
            "Input contains {} in field '{}'",
            if v.is_nan() { "NaN" } else { "infinity" },
            name
        ))),
        None => Ok(()),
    }
}

/// Soil and climate readings for crop recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropQuery {
    #[serde(rename = "N", deserialize_with = "lenient_f64")]
    pub n: f64,
    #[serde(rename = "P", deserialize_with = "lenient_f64")]
    pub p: f64,
    #[serde(rename = "K", deserialize_with = "lenient_f64")]
    pub k: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub temperature: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub humidity: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub ph: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub rainfall: f64,
}

impl CropQuery {
    pub fn validate(&self) -> Result<(), InferenceError> {
        check_finite(&[
            ("N", self.n),
            ("P", self.p),
            ("K", self.k),
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("ph", self.ph),
            ("rainfall", self.rainfall),
        ])
    }
}

/// Field conditions for fertilizer recommendation
///
/// `Temparature` is spelled as the trained pipeline and existing clients
/// spell it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerQuery {
    #[serde(rename = "Temparature", deserialize_with = "lenient_f64")]
    pub temparature: f64,
    #[serde(rename = "Humidity", deserialize_with = "lenient_f64")]
    pub humidity: f64,
    #[serde(rename = "Moisture", deserialize_with = "lenient_f64")]
    pub moisture: f64,
    #[serde(rename = "Soil_Type")]
    pub soil_type: String,
    #[serde(rename = "Crop_Type")]
    pub crop_type: String,
    #[serde(rename = "Nitrogen", deserialize_with = "lenient_f64")]
    pub nitrogen: f64,
    #[serde(rename = "Potassium", deserialize_with = "lenient_f64")]
    pub potassium: f64,
    #[serde(rename = "Phosphorous", deserialize_with = "lenient_f64")]
    pub phosphorous: f64,
}

impl FertilizerQuery {
    pub fn validate(&self) -> Result<(), InferenceError> {
        check_finite(&[
            ("Temparature", self.temparature),
            ("Humidity", self.humidity),
            ("Moisture", self.moisture),
            ("Nitrogen", self.nitrogen),
            ("Potassium", self.potassium),
            ("Phosphorous", self.phosphorous),
        ])
    }
}

/// One ranked crop candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub class: String,
    pub probability: f64,
}

/// Response of `POST /prediction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPrediction {
    pub top_prediction: Vec<ClassProbability>,
}

/// Response of `POST /soil_classification`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilPrediction {
    pub soil: String,
}

/// Response of `POST /fertilizerReccommendation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerPrediction {
    pub prediction: String,
}

/// Response of `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub message: String,
}

impl Default for WelcomeMessage {
    fn default() -> Self {
        Self {
            message: "Welcome to the Crop Prediction API".to_string(),
        }
    }
}

/// Body of every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Indices of the `k` highest probabilities, highest first.
/// Equal probabilities keep ascending index order; NaN entries are skipped.
pub fn top_k(probabilities: &[f32], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..probabilities.len())
        .filter(|&i| !probabilities[i].is_nan())
        .collect();

    // stable sort keeps ascending index among equal probabilities
    indices.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    indices.truncate(k);
    indices
}
