//! Tabular Artifacts
//!
//! Pre-fit label decoders, scalers and the one-hot encoder, exported from the
//! fitted scikit-learn objects as JSON. They are applied exactly as fitted;
//! nothing here refits.

use std::fs;
use std::path::Path;

use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preprocess::tabular::{Cell, FeatureRecord};
use crate::utils::error::{Result, ResultExt};

/// Failure while applying a fitted transform to request data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Row width differs from what the transform was fitted on
    #[error("X has {actual} features, but {transform} is expecting {expected} features as input")]
    FeatureCount {
        transform: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Column names differ from the names seen during fit
    #[error("The feature names should match those that were passed during fit: expected {expected:?}, got {actual:?}")]
    FeatureNames {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Category value not present in the fitted category set
    #[error("Found unknown categories ['{value}'] in column {column} during transform")]
    UnknownCategory { column: usize, value: String },

    /// Column required by the transform is absent
    #[error("Column '{0}' is missing from the input")]
    MissingColumn(String),

    /// Numeric transform received a categorical cell
    #[error("Column '{0}' is not numeric")]
    NonNumeric(String),

    /// Categorical transform received a numeric cell
    #[error("Column '{0}' is not categorical")]
    NonCategorical(String),

    /// Class index outside the decoder's classes
    #[error("y contains previously unseen labels: [{index}] (decoder knows {known} classes)")]
    UnknownLabel { index: usize, known: usize },
}

/// Read and deserialize a JSON artifact
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).artifact(path)?;
    serde_json::from_str(&json).artifact(path)
}

/// Maps class indices produced by a classifier back to their labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Class labels, position = class index
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a label encoder from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let encoder: Self = load_json(path)?;
        encoder.validate().artifact(path)?;
        Ok(encoder)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.classes.is_empty() {
            return Err("label encoder has no classes".to_string());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Decode one class index
    pub fn inverse_transform(&self, index: usize) -> std::result::Result<&str, TransformError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(TransformError::UnknownLabel {
                index,
                known: self.classes.len(),
            })
    }
}

/// Fitted parameters of a numeric scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

/// A pre-fit, deterministic per-column linear rescaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    /// Column names seen during fit, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,

    #[serde(flatten)]
    pub params: ScalerParams,
}

impl Scaler {
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            feature_names: None,
            params: ScalerParams::Standard { mean, scale },
        }
    }

    pub fn min_max(min: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            feature_names: None,
            params: ScalerParams::MinMax { min, scale },
        }
    }

    /// Require these column names at transform time
    pub fn with_feature_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Load a scaler from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let scaler: Self = load_json(path)?;
        scaler.validate().artifact(path)?;
        Ok(scaler)
    }

    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        match &self.params {
            ScalerParams::Standard { mean, .. } => mean.len(),
            ScalerParams::MinMax { min, .. } => min.len(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let (offset, scale) = match &self.params {
            ScalerParams::Standard { mean, scale } => (mean, scale),
            ScalerParams::MinMax { min, scale } => (min, scale),
        };

        if offset.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if offset.len() != scale.len() {
            return Err(format!(
                "scaler parameter lengths differ ({} vs {})",
                offset.len(),
                scale.len()
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != offset.len() {
                return Err(format!(
                    "scaler has {} feature names for {} features",
                    names.len(),
                    offset.len()
                ));
            }
        }
        if let ScalerParams::Standard { scale, .. } = &self.params {
            if scale.iter().any(|&s| s == 0.0) {
                return Err("standard scaler has a zero scale".to_string());
            }
        }
        Ok(())
    }

    /// Scale a single-row record into a `[1, n_features]` matrix
    pub fn transform(&self, record: &FeatureRecord) -> std::result::Result<Array2<f64>, TransformError> {
        let values = record.numeric_values()?;

        if values.len() != self.n_features() {
            return Err(TransformError::FeatureCount {
                transform: "Scaler",
                expected: self.n_features(),
                actual: values.len(),
            });
        }

        if let Some(expected) = &self.feature_names {
            let actual: Vec<String> = record.column_names().map(str::to_string).collect();
            if &actual != expected {
                return Err(TransformError::FeatureNames {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let scaled: Vec<f64> = match &self.params {
            ScalerParams::Standard { mean, scale } => values
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            ScalerParams::MinMax { min, scale } => values
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };

        let width = scaled.len();
        Array2::from_shape_vec((1, width), scaled).map_err(|_| TransformError::FeatureCount {
            transform: "Scaler",
            expected: self.n_features(),
            actual: width,
        })
    }
}

/// What the encoder does with a category it never saw during fit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    /// Emit an all-zero indicator block
    Ignore,
}

/// Pre-fit one-hot encoder over a fixed set of categorical columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Categorical input columns, in fit order
    pub feature_names_in: Vec<String>,
    /// Known categories per input column
    pub categories: Vec<Vec<String>>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn new(feature_names_in: Vec<String>, categories: Vec<Vec<String>>) -> Self {
        Self {
            feature_names_in,
            categories,
            handle_unknown: HandleUnknown::Error,
        }
    }

    /// Load a one-hot encoder from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let encoder: Self = load_json(path)?;
        encoder.validate().artifact(path)?;
        Ok(encoder)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.feature_names_in.is_empty() {
            return Err("one-hot encoder has no input columns".to_string());
        }
        if self.feature_names_in.len() != self.categories.len() {
            return Err(format!(
                "one-hot encoder has {} columns but {} category lists",
                self.feature_names_in.len(),
                self.categories.len()
            ));
        }
        if let Some(pos) = self.categories.iter().position(Vec::is_empty) {
            return Err(format!(
                "one-hot encoder column '{}' has no categories",
                self.feature_names_in[pos]
            ));
        }
        Ok(())
    }

    /// Indicator column names, `<column>_<category>`
    pub fn feature_names_out(&self) -> Vec<String> {
        self.feature_names_in
            .iter()
            .zip(&self.categories)
            .flat_map(|(column, cats)| cats.iter().map(move |cat| format!("{}_{}", column, cat)))
            .collect()
    }

    /// Encode the categorical columns of `record` into indicator columns
    pub fn transform(&self, record: &FeatureRecord) -> std::result::Result<FeatureRecord, TransformError> {
        let mut encoded = FeatureRecord::new();

        for (column_idx, (column, cats)) in self.feature_names_in.iter().zip(&self.categories).enumerate() {
            let value = match record.get(column) {
                Some(Cell::Category(value)) => value,
                Some(Cell::Number(_)) => return Err(TransformError::NonCategorical(column.clone())),
                None => return Err(TransformError::MissingColumn(column.clone())),
            };

            let hit = cats.iter().position(|cat| cat == value);
            if hit.is_none() && self.handle_unknown == HandleUnknown::Error {
                return Err(TransformError::UnknownCategory {
                    column: column_idx,
                    value: value.clone(),
                });
            }

            for (cat_idx, cat) in cats.iter().enumerate() {
                let indicator = if hit == Some(cat_idx) { 1.0 } else { 0.0 };
                encoded.push_number(format!("{}_{}", column, cat), indicator);
            }
        }

        Ok(encoded)
    }
}
