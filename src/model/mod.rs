//! Model artifacts and the registry that owns them
//!
//! - `artifacts`: label decoders, scalers and the one-hot encoder (JSON)
//! - `classifier`: the `Classifier` capability and its ONNX implementation
//! - `registry`: the process-lifetime set of loaded artifacts

pub mod artifacts;
pub mod classifier;
pub mod registry;

pub use artifacts::{HandleUnknown, LabelEncoder, OneHotEncoder, Scaler, ScalerParams, TransformError};
pub use classifier::{argmax, Classifier, ClassifierError, OnnxClassifier};
pub use registry::{CropModels, FertilizerModels, ModelRegistry, SoilModels, Task};
