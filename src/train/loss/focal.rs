//! Focal loss

use super::cross_entropy::weighted_cross_entropy;
use super::{Criterion, LossOutput};
use ndarray::Axis;

/// `loss = (1 - e^{-ce})^gamma * ce` on top of (weighted) cross-entropy
#[derive(Debug, Clone)]
pub struct FocalLoss {
    gamma: f32,
    weights: Option<Vec<f32>>,
}

impl FocalLoss {
    pub fn new(gamma: f32, weights: Option<Vec<f32>>) -> Self {
        Self { gamma, weights }
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// `d loss / d ce`
    fn chain_factor(&self, ce: f32) -> f32 {
        let q = 1.0 - (-ce).exp();
        if q <= 0.0 {
            return if self.gamma == 0.0 { 1.0 } else { 0.0 };
        }
        self.gamma * q.powf(self.gamma - 1.0) * (-ce).exp() * ce + q.powf(self.gamma)
    }
}

impl Criterion for FocalLoss {
    fn forward(&self, logits: &ndarray::Array2<f32>, labels: &[usize]) -> LossOutput {
        let LossOutput { losses: ce, mut grad } =
            weighted_cross_entropy(logits, labels, self.weights.as_deref());

        let mut losses = Vec::with_capacity(ce.len());
        for (&ce_i, mut grad_row) in ce.iter().zip(grad.axis_iter_mut(Axis(0))) {
            let q = (1.0 - (-ce_i).exp()).max(0.0);
            losses.push(q.powf(self.gamma) * ce_i);
            let factor = self.chain_factor(ce_i);
            grad_row.mapv_inplace(|g| g * factor);
        }

        LossOutput { losses, grad }
    }

    fn name(&self) -> &str {
        "Focal"
    }
}
