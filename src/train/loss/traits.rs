//! Loss function trait

use ndarray::Array2;

/// Unreduced output of a [`Criterion`]
#[derive(Debug, Clone)]
pub struct LossOutput {
    /// Loss of every sample
    pub losses: Vec<f32>,
    /// `d losses[i] / d logits[i, :]`, `batch x num_classes`
    pub grad: Array2<f32>,
}

impl LossOutput {
    pub fn sum(&self) -> f32 {
        self.losses.iter().sum()
    }

    /// Mean loss, 0 for an empty batch
    pub fn mean(&self) -> f32 {
        if self.losses.is_empty() {
            0.0
        } else {
            self.sum() / self.losses.len() as f32
        }
    }

    /// Gradient of [`mean`](Self::mean) w.r.t. the logits
    pub fn mean_grad(&self) -> Array2<f32> {
        let n = self.losses.len().max(1) as f32;
        &self.grad / n
    }
}

/// Trait for classification loss functions
pub trait Criterion {
    /// Per-sample losses and logit gradients
    fn forward(&self, logits: &Array2<f32>, labels: &[usize]) -> LossOutput;

    /// Name of the loss function
    fn name(&self) -> &str;
}
