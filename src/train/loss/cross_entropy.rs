//! Cross-entropy loss

use super::{Criterion, LossOutput};
use ndarray::{Array2, Axis};

/// Cross-entropy with optional per-class weights
///
/// `loss_i = -w[y_i] * log softmax(z_i)[y_i]`
#[derive(Debug, Clone, Default)]
pub struct CrossEntropyLoss {
    weights: Option<Vec<f32>>,
}

impl CrossEntropyLoss {
    pub fn new() -> Self {
        Self { weights: None }
    }

    pub fn weighted(weights: Vec<f32>) -> Self {
        Self {
            weights: Some(weights),
        }
    }

    pub fn weights(&self) -> Option<&[f32]> {
        self.weights.as_deref()
    }
}

impl Criterion for CrossEntropyLoss {
    fn forward(&self, logits: &Array2<f32>, labels: &[usize]) -> LossOutput {
        weighted_cross_entropy(logits, labels, self.weights.as_deref())
    }

    fn name(&self) -> &str {
        "CrossEntropy"
    }
}

/// Shared by every criterion in this module
pub(super) fn weighted_cross_entropy(
    logits: &Array2<f32>,
    labels: &[usize],
    weights: Option<&[f32]>,
) -> LossOutput {
    let mut grad = Array2::zeros(logits.raw_dim());
    let mut losses = Vec::with_capacity(labels.len());

    for ((row, mut grad_row), &label) in logits
        .axis_iter(Axis(0))
        .zip(grad.axis_iter_mut(Axis(0)))
        .zip(labels)
    {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let sum_exp: f32 = row.iter().map(|&v| (v - max).exp()).sum();
        let log_norm = max + sum_exp.ln();
        let weight = weights.and_then(|w| w.get(label).copied()).unwrap_or(1.0);

        losses.push(weight * (log_norm - row[label]));
        for (g, &v) in grad_row.iter_mut().zip(row.iter()) {
            *g = weight * (v - log_norm).exp();
        }
        grad_row[label] -= weight;
    }

    LossOutput { losses, grad }
}
