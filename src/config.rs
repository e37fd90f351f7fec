//! Service Configuration
//!
//! Server settings and the locations of the model artifacts. Values come
//! from defaults, an optional JSON file, then CLI flags / environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::error::{AgriError, Result};

/// Default upload limit for soil images (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Artifact file locations. Relative paths are resolved against the models
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub crop_classifier: PathBuf,
    pub crop_label_encoder: PathBuf,
    pub crop_scaler: PathBuf,
    pub soil_classifier: PathBuf,
    pub soil_label_encoder: PathBuf,
    pub fertilizer_encoder: PathBuf,
    pub fertilizer_scaler: PathBuf,
    pub fertilizer_classifier: PathBuf,
    pub fertilizer_label_encoder: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            crop_classifier: PathBuf::from("crop_classifier.onnx"),
            crop_label_encoder: PathBuf::from("crop_label_encoder.json"),
            crop_scaler: PathBuf::from("crop_scaler.json"),
            soil_classifier: PathBuf::from("soil_classifier.onnx"),
            soil_label_encoder: PathBuf::from("soil_label_encoder.json"),
            fertilizer_encoder: PathBuf::from("fertilizer_onehot.json"),
            fertilizer_scaler: PathBuf::from("fertilizer_scaler.json"),
            fertilizer_classifier: PathBuf::from("fertilizer_classifier.onnx"),
            fertilizer_label_encoder: PathBuf::from("fertilizer_label_encoder.json"),
        }
    }
}

impl ArtifactPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::default().resolve(dir)
    }

    /// Join every relative path onto `dir`
    pub fn resolve(&self, dir: &Path) -> Self {
        let join = |p: &PathBuf| if p.is_absolute() { p.clone() } else { dir.join(p) };
        Self {
            crop_classifier: join(&self.crop_classifier),
            crop_label_encoder: join(&self.crop_label_encoder),
            crop_scaler: join(&self.crop_scaler),
            soil_classifier: join(&self.soil_classifier),
            soil_label_encoder: join(&self.soil_label_encoder),
            fertilizer_encoder: join(&self.fertilizer_encoder),
            fertilizer_scaler: join(&self.fertilizer_scaler),
            fertilizer_classifier: join(&self.fertilizer_classifier),
            fertilizer_label_encoder: join(&self.fertilizer_label_encoder),
        }
    }

    /// All artifact paths, labelled
    pub fn entries(&self) -> [(&'static str, &Path); 9] {
        [
            ("crop classifier", self.crop_classifier.as_path()),
            ("crop label encoder", self.crop_label_encoder.as_path()),
            ("crop scaler", self.crop_scaler.as_path()),
            ("soil classifier", self.soil_classifier.as_path()),
            ("soil label encoder", self.soil_label_encoder.as_path()),
            ("fertilizer one-hot encoder", self.fertilizer_encoder.as_path()),
            ("fertilizer scaler", self.fertilizer_scaler.as_path()),
            ("fertilizer classifier", self.fertilizer_classifier.as_path()),
            ("fertilizer label encoder", self.fertilizer_label_encoder.as_path()),
        ]
    }

    /// Paths that do not exist on disk
    pub fn missing(&self) -> Vec<&Path> {
        self.entries()
            .into_iter()
            .map(|(_, path)| path)
            .filter(|path| !path.exists())
            .collect()
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory containing the model artifacts
    pub models_dir: PathBuf,
    /// Artifact file names (relative to `models_dir` unless absolute)
    pub artifacts: ArtifactPaths,
    /// Maximum accepted request body for image uploads
    pub max_upload_bytes: usize,
    /// Replace the text of internal errors with a generic message
    pub redact_internal_errors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            models_dir: PathBuf::from("models"),
            artifacts: ArtifactPaths::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            redact_internal_errors: false,
        }
    }
}

impl ServerConfig {
    /// Artifact paths resolved against `models_dir`
    pub fn artifact_paths(&self) -> ArtifactPaths {
        self.artifacts.resolve(&self.models_dir)
    }

    /// Address to bind the listener to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AgriError::Config(format!("invalid bind address {}:{}: {}", self.host, self.port, e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(AgriError::Config("max_upload_bytes must be greater than 0".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from a JSON file; absent keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_artifact_paths_resolve() {
        let paths = ArtifactPaths {
            soil_classifier: PathBuf::from("/opt/models/soil.onnx"),
            ..ArtifactPaths::default()
        }
        .resolve(Path::new("models"));

        assert_eq!(paths.crop_scaler, PathBuf::from("models/crop_scaler.json"));
        assert_eq!(paths.soil_classifier, PathBuf::from("/opt/models/soil.onnx"));
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        assert_eq!(paths.missing().len(), 9);

        std::fs::write(&paths.crop_scaler, "{}").unwrap();
        assert_eq!(paths.missing().len(), 8);
    }

    #[test]
    fn test_save_and_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");
        std::fs::write(&path, r#"{"port": 9100, "redact_internal_errors": true}"#).unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.port, 9100);
        assert!(config.redact_internal_errors);
        assert_eq!(config.host, "0.0.0.0");

        config.save(&path).unwrap();
        assert_eq!(ServerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        let config = ServerConfig {
            max_upload_bytes: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(AgriError::Config(_))));

        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
