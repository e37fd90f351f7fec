//! Preprocessing for model inputs
//!
//! - `image`: decode uploads and build the soil classifier tensor
//! - `tabular`: named feature records, one-hot encoding and scaling for the
//!   crop and fertilizer classifiers

pub mod image;
pub mod tabular;

pub use self::image::{decode_image, ImagePreprocessor, SOIL_IMAGE_SIZE};
pub use tabular::{Cell, FeatureRecord, CROP_FEATURE_COLUMNS};
