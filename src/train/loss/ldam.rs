//! Label-distribution-aware margin loss

use super::cross_entropy::weighted_cross_entropy;
use super::{Criterion, LossOutput};
use crate::data::ClassStatistics;
use ndarray::Array2;

/// Cross-entropy on `s * (z - m_y e_y)`
///
/// Rare classes get larger margins `m_c ∝ n_c^{-1/4}`.
#[derive(Debug, Clone)]
pub struct LdamLoss {
    margins: Vec<f32>,
    scale: f32,
    weights: Option<Vec<f32>>,
}

impl LdamLoss {
    /// Margins from the training class counts
    pub fn new(
        stats: &ClassStatistics,
        max_margin: f32,
        scale: f32,
        weights: Option<Vec<f32>>,
    ) -> Self {
        Self::with_margins(stats.ldam_margins(max_margin), scale, weights)
    }

    pub fn with_margins(margins: Vec<f32>, scale: f32, weights: Option<Vec<f32>>) -> Self {
        Self {
            margins,
            scale,
            weights,
        }
    }

    pub fn margins(&self) -> &[f32] {
        &self.margins
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl Criterion for LdamLoss {
    fn forward(&self, logits: &Array2<f32>, labels: &[usize]) -> LossOutput {
        let mut shifted = logits.clone();
        for (i, &label) in labels.iter().enumerate() {
            shifted[[i, label]] -= self.margins.get(label).copied().unwrap_or(0.0);
        }
        shifted.mapv_inplace(|v| v * self.scale);

        let mut out = weighted_cross_entropy(&shifted, labels, self.weights.as_deref());
        out.grad.mapv_inplace(|g| g * self.scale);
        out
    }

    fn name(&self) -> &str {
        "LDAM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::loss::CrossEntropyLoss;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_minority_gets_largest_margin() {
        let stats = ClassStatistics::new(vec![1000, 10]).unwrap();
        let loss = LdamLoss::new(&stats, 0.5, 30.0, None);
        assert_relative_eq!(loss.margins()[1], 0.5, epsilon = 1e-6);
        assert!(loss.margins()[0] < loss.margins()[1]);
    }

    #[test]
    fn test_zero_margin_unit_scale_is_cross_entropy() {
        let logits = array![[0.1, 0.9, -0.2]];
        let ldam = LdamLoss::with_margins(vec![0.0; 3], 1.0, None).forward(&logits, &[1]);
        let ce = CrossEntropyLoss::new().forward(&logits, &[1]);
        assert_relative_eq!(ldam.losses[0], ce.losses[0], epsilon = 1e-6);
    }

    #[test]
    fn test_margin_increases_loss() {
        let logits = array![[0.5, 0.2]];
        let with = LdamLoss::with_margins(vec![0.5, 0.5], 1.0, None).forward(&logits, &[0]);
        let without = LdamLoss::with_margins(vec![0.0, 0.0], 1.0, None).forward(&logits, &[0]);
        assert!(with.losses[0] > without.losses[0]);
    }

    #[test]
    fn test_gradient_includes_scale() {
        let loss = LdamLoss::with_margins(vec![0.2, 0.4], 5.0, None);
        let logits = array![[0.1, -0.1]];
        let out = loss.forward(&logits, &[1]);

        let h = 1e-3;
        let mut plus = logits.clone();
        plus[[0, 0]] += h;
        let mut minus = logits.clone();
        minus[[0, 0]] -= h;
        let numeric =
            (loss.forward(&plus, &[1]).losses[0] - loss.forward(&minus, &[1]).losses[0]) / (2.0 * h);
        assert_relative_eq!(out.grad[[0, 0]], numeric, epsilon = 1e-2);
    }
}
