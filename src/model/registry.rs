//! Model Registry
//!
//! Owns every artifact for the lifetime of the process. Built once before
//! the server binds; request handlers only ever see shared references.

use ndarray::ArrayD;
use serde::Serialize;
use tracing::info;

use crate::config::ArtifactPaths;
use crate::model::artifacts::{LabelEncoder, OneHotEncoder, Scaler};
use crate::model::classifier::{Classifier, OnnxClassifier};
use crate::preprocess::image::SOIL_IMAGE_SIZE;
use crate::preprocess::tabular::{CROP_FEATURE_COLUMNS, FERTILIZER_CATEGORICAL_COLUMNS};
use crate::utils::error::{AgriError, Result};

/// Prediction tasks served by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Crop,
    Soil,
    Fertilizer,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::Crop, Task::Soil, Task::Fertilizer];

    pub fn name(&self) -> &'static str {
        match self {
            Task::Crop => "crop",
            Task::Soil => "soil",
            Task::Fertilizer => "fertilizer",
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Crop recommendation artifacts
pub struct CropModels {
    pub classifier: Box<dyn Classifier>,
    pub labels: LabelEncoder,
    pub scaler: Scaler,
}

/// Soil classification artifacts
pub struct SoilModels {
    pub classifier: Box<dyn Classifier>,
    pub labels: LabelEncoder,
}

/// Fertilizer recommendation artifacts
pub struct FertilizerModels {
    pub encoder: OneHotEncoder,
    pub scaler: Scaler,
    pub classifier: Box<dyn Classifier>,
    pub labels: LabelEncoder,
}

/// Immutable set of every loaded artifact
pub struct ModelRegistry {
    crop: CropModels,
    soil: SoilModels,
    fertilizer: FertilizerModels,
}

impl ModelRegistry {
    /// Assemble a registry from already-loaded parts, checking consistency
    pub fn new(crop: CropModels, soil: SoilModels, fertilizer: FertilizerModels) -> Result<Self> {
        let registry = Self { crop, soil, fertilizer };
        registry.validate()?;
        Ok(registry)
    }

    /// Load every artifact from disk. Any failure aborts startup.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let missing = paths.missing();
        if !missing.is_empty() {
            let listed: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            return Err(AgriError::Config(format!("missing model artifacts: {}", listed.join(", "))));
        }

        let crop_scaler = Scaler::load(&paths.crop_scaler)?;
        let crop = CropModels {
            classifier: Box::new(OnnxClassifier::load(
                &paths.crop_classifier,
                &[1, crop_scaler.n_features()],
            )?),
            labels: LabelEncoder::load(&paths.crop_label_encoder)?,
            scaler: crop_scaler,
        };
        info!(
            "Loaded crop models: {} classes, {} features",
            crop.labels.len(),
            crop.scaler.n_features()
        );

        let side = SOIL_IMAGE_SIZE as usize;
        let soil = SoilModels {
            classifier: Box::new(OnnxClassifier::load(&paths.soil_classifier, &[1, side, side, 3])?),
            labels: LabelEncoder::load(&paths.soil_label_encoder)?,
        };
        info!("Loaded soil models: {} classes", soil.labels.len());

        let fertilizer_scaler = Scaler::load(&paths.fertilizer_scaler)?;
        let fertilizer = FertilizerModels {
            encoder: OneHotEncoder::load(&paths.fertilizer_encoder)?,
            classifier: Box::new(OnnxClassifier::load(
                &paths.fertilizer_classifier,
                &[1, fertilizer_scaler.n_features()],
            )?),
            labels: LabelEncoder::load(&paths.fertilizer_label_encoder)?,
            scaler: fertilizer_scaler,
        };
        info!(
            "Loaded fertilizer models: {} classes, {} features",
            fertilizer.labels.len(),
            fertilizer.scaler.n_features()
        );

        Self::new(crop, soil, fertilizer)
    }

    pub fn crop(&self) -> &CropModels {
        &self.crop
    }

    pub fn soil(&self) -> &SoilModels {
        &self.soil
    }

    pub fn fertilizer(&self) -> &FertilizerModels {
        &self.fertilizer
    }

    /// Tasks this registry can serve
    pub fn tasks(&self) -> [Task; 3] {
        Task::ALL
    }

    /// Class labels known for a task
    pub fn labels(&self, task: Task) -> &LabelEncoder {
        match task {
            Task::Crop => &self.crop.labels,
            Task::Soil => &self.soil.labels,
            Task::Fertilizer => &self.fertilizer.labels,
        }
    }

    fn classifier(&self, task: Task) -> &dyn Classifier {
        match task {
            Task::Crop => self.crop.classifier.as_ref(),
            Task::Soil => self.soil.classifier.as_ref(),
            Task::Fertilizer => self.fertilizer.classifier.as_ref(),
        }
    }

    /// Cross-check artifacts and probe each classifier once with a zero input
    pub fn validate(&self) -> Result<()> {
        for (name, check) in [
            ("crop label encoder", self.crop.labels.validate()),
            ("crop scaler", self.crop.scaler.validate()),
            ("soil label encoder", self.soil.labels.validate()),
            ("fertilizer one-hot encoder", self.fertilizer.encoder.validate()),
            ("fertilizer scaler", self.fertilizer.scaler.validate()),
            ("fertilizer label encoder", self.fertilizer.labels.validate()),
        ] {
            check.map_err(|e| AgriError::Model(format!("{}: {}", name, e)))?;
        }

        if self.crop.scaler.n_features() != CROP_FEATURE_COLUMNS.len() {
            return Err(AgriError::Model(format!(
                "crop scaler expects {} features, crop queries have {}",
                self.crop.scaler.n_features(),
                CROP_FEATURE_COLUMNS.len()
            )));
        }

        let encoder = &self.fertilizer.encoder;
        if encoder.feature_names_in != FERTILIZER_CATEGORICAL_COLUMNS {
            return Err(AgriError::Model(format!(
                "fertilizer encoder columns are {:?}, expected {:?}",
                encoder.feature_names_in, FERTILIZER_CATEGORICAL_COLUMNS
            )));
        }

        let numeric_columns = 6;
        let fertilizer_width = numeric_columns + encoder.feature_names_out().len();
        if self.fertilizer.scaler.n_features() != fertilizer_width {
            return Err(AgriError::Model(format!(
                "fertilizer scaler expects {} features, encoder produces {}",
                self.fertilizer.scaler.n_features(),
                fertilizer_width
            )));
        }

        for task in Task::ALL {
            self.probe(task)?;
        }

        Ok(())
    }

    fn probe(&self, task: Task) -> Result<()> {
        let classifier = self.classifier(task);
        let input = ArrayD::<f32>::zeros(classifier.input_shape());

        let probabilities = classifier
            .predict_proba(input)
            .map_err(|e| AgriError::Model(format!("{} classifier probe failed: {}", task, e)))?;

        let labels = self.labels(task).len();
        if probabilities.nrows() != 1 || probabilities.ncols() != labels {
            return Err(AgriError::Model(format!(
                "{} classifier returned shape {:?}, label encoder has {} classes",
                task,
                probabilities.shape(),
                labels
            )));
        }

        Ok(())
    }
}
