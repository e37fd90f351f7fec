//! Inference pipelines
//!
//! One synchronous function per task. Each takes the task's artifacts from
//! the registry plus the parsed request and returns the response body or an
//! `InferenceError`:
//!
//! - `crop::predict_crop`: top-4 crops with probabilities
//! - `soil::classify_soil`: one soil label for an uploaded image
//! - `fertilizer::recommend_fertilizer`: one fertilizer label

pub mod crop;
pub mod error;
pub mod fertilizer;
pub mod soil;
pub mod types;

pub use crop::{predict_crop, TOP_K};
pub use error::InferenceError;
pub use fertilizer::recommend_fertilizer;
pub use soil::classify_soil;
pub use types::{
    top_k, ClassProbability, CropPrediction, CropQuery, ErrorBody, FertilizerPrediction, FertilizerQuery,
    SoilPrediction, WelcomeMessage,
};
