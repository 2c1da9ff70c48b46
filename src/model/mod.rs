//! Classifier interface consumed by the generation pipeline
//!
//! Two instances take part in every generation epoch: the live classifier
//! being trained and the seed classifier that steers perturbations. Both are
//! driven through [`Classifier`]; [`Mlp`] is the reference implementation.

mod mlp;
mod mode;
pub mod ops;

pub use mlp::{Mlp, MlpConfig};
pub use mode::{InferenceGuard, Mode};

use crate::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Output of a forward pass
#[derive(Debug, Clone)]
pub struct ModelOutput {
    /// Class logits, `batch x num_classes`
    pub logits: Array2<f32>,
    /// Penultimate features, `batch x hidden`
    pub features: Array2<f32>,
}

/// Which gradients a backward pass produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backprop {
    /// Gradient w.r.t. the inputs only; parameter gradients are untouched
    InputOnly,
    /// Input gradient plus accumulation into parameter gradients
    Full,
}

/// Trainable weight with its accumulated gradient
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub value: Array2<f32>,
    pub grad: Array2<f32>,
}

impl Parameter {
    pub fn new(value: Array2<f32>) -> Self {
        let grad = Array2::zeros(value.raw_dim());
        Self { value, grad }
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }
}

/// Serializable snapshot of a classifier's parameters and buffers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub params: Vec<Array2<f32>>,
    pub buffers: Vec<Array1<f32>>,
}

/// A differentiable image classifier
///
/// `forward` caches what `backward` needs; a `backward` call always refers to
/// the most recent `forward`.
pub trait Classifier {
    fn num_classes(&self) -> usize;

    /// Flattened input length
    fn input_len(&self) -> usize;

    /// Forward pass on normalised inputs
    fn forward(&mut self, inputs: &Array2<f32>) -> ModelOutput;

    /// Backpropagate `grad_logits` through the last forward pass
    ///
    /// Returns the gradient w.r.t. the (normalised) inputs.
    fn backward(&mut self, grad_logits: &Array2<f32>, backprop: Backprop) -> Array2<f32>;

    fn parameters_mut(&mut self) -> Vec<&mut Parameter>;

    fn zero_grad(&mut self) {
        for param in self.parameters_mut() {
            param.zero_grad();
        }
    }

    fn mode(&self) -> Mode;

    fn set_mode(&mut self, mode: Mode);

    fn state(&self) -> ModelState;

    fn load_state(&mut self, state: ModelState) -> Result<()>;

    /// Predicted class per row
    fn predict(&mut self, inputs: &Array2<f32>) -> Vec<usize> {
        ops::argmax_rows(&self.forward(inputs).logits)
    }
}
