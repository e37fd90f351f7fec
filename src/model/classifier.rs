//! Classifier Runtime
//!
//! The `Classifier` trait is the only capability the inference pipelines need
//! from a trained model: class probabilities for one input. `OnnxClassifier`
//! implements it on top of a tract run plan, which is immutable after load and
//! safe to share across request threads.

use std::path::Path;

use ndarray::{Array2, ArrayD};
use thiserror::Error;
use tract_onnx::prelude::*;

use crate::utils::error::{Result, ResultExt};

/// Failure while running a loaded model
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Input tensor shape differs from the model's fixed input shape
    #[error("Invalid input shape: expected {expected:?}, got {actual:?}")]
    InputShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The runtime failed while executing the graph
    #[error("Model execution failed: {0}")]
    Execution(String),

    /// The graph produced no usable probability output
    #[error("Model produced no probability output: {0}")]
    Output(String),
}

/// A loaded model that maps one input to a row of class probabilities
pub trait Classifier: Send + Sync {
    /// Input shape the model accepts, batch dimension included
    fn input_shape(&self) -> &[usize];

    /// Class probabilities, shape `[batch, n_classes]`
    fn predict_proba(&self, input: ArrayD<f32>) -> std::result::Result<Array2<f32>, ClassifierError>;
}

/// Index of the highest probability; the first index wins ties
pub fn argmax(probabilities: &[f32]) -> Option<usize> {
    probabilities
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (idx, &p)| match best {
            Some((_, best_p)) if p <= best_p => best,
            _ if p.is_nan() => best,
            _ => Some((idx, p)),
        })
        .map(|(idx, _)| idx)
}

/// Classifier backed by an ONNX graph
///
/// Tabular models are expected to be exported with skl2onnx and
/// `zipmap=False`, image models with tf2onnx. The first `f32` output of rank 2
/// is taken as the probability matrix; integer label outputs are ignored.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    input_shape: Vec<usize>,
}

impl OnnxClassifier {
    /// Load and optimize an ONNX model with a fixed input shape
    pub fn load(path: &Path, input_shape: &[usize]) -> Result<Self> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), input_shape.to_vec()))
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| format!("{:#}", e))
            .artifact(path)?;

        Ok(Self {
            plan,
            input_shape: input_shape.to_vec(),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    fn predict_proba(&self, input: ArrayD<f32>) -> std::result::Result<Array2<f32>, ClassifierError> {
        if input.shape() != self.input_shape.as_slice() {
            return Err(ClassifierError::InputShape {
                expected: self.input_shape.clone(),
                actual: input.shape().to_vec(),
            });
        }

        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_shape(&self.input_shape, &data)
            .map_err(|e| ClassifierError::Execution(format!("{:#}", e)))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| ClassifierError::Execution(format!("{:#}", e)))?;

        let probabilities = outputs
            .iter()
            .find(|t| t.datum_type() == f32::datum_type() && t.rank() == 2)
            .ok_or_else(|| ClassifierError::Output(format!("{} outputs, none is a f32 matrix", outputs.len())))?;

        let shape = probabilities.shape();
        let (rows, cols) = (shape[0], shape[1]);
        let values = probabilities
            .as_slice::<f32>()
            .map_err(|e| ClassifierError::Output(format!("{:#}", e)))?
            .to_vec();

        Array2::from_shape_vec((rows, cols), values).map_err(|e| ClassifierError::Output(e.to_string()))
    }
}
