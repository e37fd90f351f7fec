//! Tabular Feature Encoding
//!
//! Builds single-row named records from request fields and pushes them
//! through the fitted encoder and scaler, in the exact column layout the
//! models were trained on.

use ndarray::Array2;

use crate::inference::types::{CropQuery, FertilizerQuery};
use crate::model::artifacts::{OneHotEncoder, Scaler, TransformError};

/// Crop model input columns, in training order
pub const CROP_FEATURE_COLUMNS: [&str; 7] = ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Fertilizer humidity column. The trailing space comes from the training
/// data header and is part of the exported scaler's feature names.
pub const FERTILIZER_HUMIDITY_COLUMN: &str = "Humidity ";

/// Fertilizer categorical columns, in encoder order
pub const FERTILIZER_CATEGORICAL_COLUMNS: [&str; 2] = ["Soil Type", "Crop Type"];

/// A single cell of a feature record
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Category(String),
}

/// A single-row table with named, ordered columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    columns: Vec<(String, Cell)>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_number(mut self, name: impl Into<String>, value: f64) -> Self {
        self.push_number(name, value);
        self
    }

    pub fn with_category(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.push((name.into(), Cell::Category(value.into())));
        self
    }

    pub fn push_number(&mut self, name: impl Into<String>, value: f64) {
        self.columns.push((name.into(), Cell::Number(value)));
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, cell)| cell)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Append the columns of `other` after this record's columns
    pub fn concat(mut self, other: FeatureRecord) -> Self {
        self.columns.extend(other.columns);
        self
    }

    /// Remove the named columns, keeping the order of the rest
    pub fn drop_columns(mut self, names: &[&str]) -> Self {
        self.columns.retain(|(name, _)| !names.contains(&name.as_str()));
        self
    }

    /// All cells as numbers, in column order
    pub fn numeric_values(&self) -> Result<Vec<f64>, TransformError> {
        self.columns
            .iter()
            .map(|(name, cell)| match cell {
                Cell::Number(v) => Ok(*v),
                Cell::Category(_) => Err(TransformError::NonNumeric(name.clone())),
            })
            .collect()
    }
}

/// Build the crop record in training column order
pub fn crop_record(query: &CropQuery) -> FeatureRecord {
    let values = [
        query.n,
        query.p,
        query.k,
        query.temperature,
        query.humidity,
        query.ph,
        query.rainfall,
    ];

    CROP_FEATURE_COLUMNS
        .iter()
        .zip(values)
        .fold(FeatureRecord::new(), |record, (name, value)| record.with_number(*name, value))
}

/// Encode a crop query into the scaled `[1, 7]` model input
pub fn encode_crop(query: &CropQuery, scaler: &Scaler) -> Result<Array2<f64>, TransformError> {
    scaler.transform(&crop_record(query))
}

/// Build the raw fertilizer record, categorical columns included
pub fn fertilizer_record(query: &FertilizerQuery) -> FeatureRecord {
    FeatureRecord::new()
        .with_number("Temparature", query.temparature)
        .with_number(FERTILIZER_HUMIDITY_COLUMN, query.humidity)
        .with_number("Moisture", query.moisture)
        .with_category(FERTILIZER_CATEGORICAL_COLUMNS[0], query.soil_type.as_str())
        .with_category(FERTILIZER_CATEGORICAL_COLUMNS[1], query.crop_type.as_str())
        .with_number("Nitrogen", query.nitrogen)
        .with_number("Potassium", query.potassium)
        .with_number("Phosphorous", query.phosphorous)
}

/// One-hot encode the fertilizer categoricals: indicators are appended and
/// the original categorical columns dropped.
pub fn encode_fertilizer(query: &FertilizerQuery, encoder: &OneHotEncoder) -> Result<FeatureRecord, TransformError> {
    let record = fertilizer_record(query);
    let indicators = encoder.transform(&record)?;

    Ok(record
        .concat(indicators)
        .drop_columns(&FERTILIZER_CATEGORICAL_COLUMNS))
}

/// Scale an encoded fertilizer record into the model input row
pub fn scale_fertilizer(record: &FeatureRecord, scaler: &Scaler) -> Result<Array2<f64>, TransformError> {
    scaler.transform(record)
}
