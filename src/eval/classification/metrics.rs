//! Multi-class classification metrics

use super::confusion::ConfusionMatrix;

/// Per-class precision, recall and F1 derived from a confusion matrix
#[derive(Clone, Debug)]
pub struct MultiClassMetrics {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub f1: Vec<f64>,
    /// Per-class support (count)
    pub support: Vec<usize>,
    pub n_classes: usize,
}

impl MultiClassMetrics {
    /// Compute metrics from confusion matrix
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let n_classes = cm.n_classes();
        let mut precision = Vec::with_capacity(n_classes);
        let mut recall = Vec::with_capacity(n_classes);
        let mut f1 = Vec::with_capacity(n_classes);
        let mut support = Vec::with_capacity(n_classes);

        for class in 0..n_classes {
            let tp = cm.true_positives(class) as f64;
            let fp = cm.false_positives(class) as f64;
            let fn_ = cm.false_negatives(class) as f64;

            let p = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let r = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
            let f = if p + r > 0.0 {
                2.0 * p * r / (p + r)
            } else {
                0.0
            };

            precision.push(p);
            recall.push(r);
            f1.push(f);
            support.push(cm.support(class));
        }

        Self {
            precision,
            recall,
            f1,
            support,
            n_classes,
        }
    }

    /// Unweighted mean F1 over all classes
    pub fn macro_f1(&self) -> f64 {
        if self.f1.is_empty() {
            0.0
        } else {
            self.f1.iter().sum::<f64>() / self.f1.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_predictions() {
        let cm = ConfusionMatrix::from_predictions(&[0, 1, 2], &[0, 1, 2], 3);
        let m = MultiClassMetrics::from_confusion_matrix(&cm);
        assert!(m.f1.iter().all(|&f| (f - 1.0).abs() < 1e-12));
        assert_relative_eq!(m.macro_f1(), 1.0);
    }

    #[test]
    fn test_precision_recall() {
        // class 0: tp=2 fp=1 fn=0; class 1: tp=1 fp=0 fn=1
        let cm = ConfusionMatrix::from_predictions(&[0, 0, 0, 1], &[0, 0, 1, 1], 2);
        let m = MultiClassMetrics::from_confusion_matrix(&cm);
        assert_relative_eq!(m.precision[0], 2.0 / 3.0);
        assert_relative_eq!(m.recall[1], 0.5);
        assert_relative_eq!(m.f1[1], 2.0 * 1.0 * 0.5 / 1.5);
        assert_eq!(m.support, vec![2, 2]);
    }

    #[test]
    fn test_absent_class_scores_zero() {
        let cm = ConfusionMatrix::from_predictions(&[0, 0], &[0, 0], 2);
        let m = MultiClassMetrics::from_confusion_matrix(&cm);
        assert_eq!(m.f1[1], 0.0);
        assert_relative_eq!(m.macro_f1(), 0.5);
    }
}
