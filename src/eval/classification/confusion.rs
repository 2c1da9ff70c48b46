//! Confusion matrix for multi-class classification

use std::fmt;

/// Confusion matrix for multi-class classification
///
/// Element [i][j] represents count of samples with true label i predicted as j
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfusionMatrix {
    /// The matrix data: matrix[true_label][predicted_label] = count
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

impl ConfusionMatrix {
    /// Create an empty confusion matrix with given number of classes
    pub fn new(n_classes: usize) -> Self {
        Self {
            matrix: vec![vec![0; n_classes]; n_classes],
            n_classes,
        }
    }

    /// Create from predictions and ground truth
    pub fn from_predictions(y_pred: &[usize], y_true: &[usize], n_classes: usize) -> Self {
        let mut cm = Self::new(n_classes);
        cm.extend(y_pred, y_true);
        cm
    }

    /// Record one sample; out-of-range labels are ignored
    pub fn add(&mut self, true_label: usize, predicted_label: usize) {
        if true_label < self.n_classes && predicted_label < self.n_classes {
            self.matrix[true_label][predicted_label] += 1;
        }
    }

    pub fn extend(&mut self, y_pred: &[usize], y_true: &[usize]) {
        for (&pred, &true_label) in y_pred.iter().zip(y_true) {
            self.add(true_label, pred);
        }
    }

    /// Get the raw matrix
    pub fn matrix(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Get element at [true_label][predicted_label]
    pub fn get(&self, true_label: usize, predicted_label: usize) -> usize {
        self.matrix[true_label][predicted_label]
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.matrix[class][class]
    }

    /// Predicted as class but wasn't
    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.n_classes)
            .filter(|&i| i != class)
            .map(|i| self.matrix[i][class])
            .sum()
    }

    /// Was class but predicted differently
    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.n_classes)
            .filter(|&j| j != class)
            .map(|j| self.matrix[class][j])
            .sum()
    }

    /// Total true instances of a class
    pub fn support(&self, class: usize) -> usize {
        self.matrix[class].iter().sum()
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.n_classes).map(|i| self.matrix[i][i]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct() as f64 / total as f64
    }

    /// Recall of a class, `None` when it has no support
    pub fn recall(&self, class: usize) -> Option<f64> {
        let support = self.support(class);
        (support > 0).then(|| self.true_positives(class) as f64 / support as f64)
    }

    /// Recalls of the classes present in the ground truth
    pub fn present_recalls(&self) -> Vec<f64> {
        (0..self.n_classes).filter_map(|c| self.recall(c)).collect()
    }

    /// Mean recall over the classes present in the ground truth
    pub fn balanced_accuracy(&self) -> f64 {
        let recalls = self.present_recalls();
        if recalls.is_empty() {
            return 0.0;
        }
        recalls.iter().sum::<f64>() / recalls.len() as f64
    }

    /// Geometric mean of the present classes' recalls
    ///
    /// Zero as soon as one present class is never predicted correctly.
    pub fn geometric_mean(&self) -> f64 {
        let recalls = self.present_recalls();
        if recalls.is_empty() || recalls.iter().any(|&r| r <= 0.0) {
            return 0.0;
        }
        let log_sum: f64 = recalls.iter().map(|r| r.ln()).sum();
        (log_sum / recalls.len() as f64).exp()
    }

    /// Add another matrix of the same size
    pub fn merge(&mut self, other: &ConfusionMatrix) {
        for (row, other_row) in self.matrix.iter_mut().zip(&other.matrix) {
            for (cell, &count) in row.iter_mut().zip(other_row) {
                *cell += count;
            }
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion Matrix:")?;

        write!(f, "      ")?;
        for j in 0..self.n_classes {
            write!(f, "Pred {j} ")?;
        }
        writeln!(f)?;

        for i in 0..self.n_classes {
            write!(f, "True {i}")?;
            for j in 0..self.n_classes {
                write!(f, "{:>6} ", self.matrix[i][j])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_counts() {
        let cm = ConfusionMatrix::from_predictions(&[0, 1, 1, 2], &[0, 1, 2, 2], 3);
        assert_eq!(cm.get(2, 1), 1);
        assert_eq!(cm.true_positives(2), 1);
        assert_eq!(cm.false_positives(1), 1);
        assert_eq!(cm.false_negatives(2), 1);
        assert_eq!(cm.support(2), 2);
        assert_eq!(cm.total(), 4);
        assert_relative_eq!(cm.accuracy(), 0.75);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut cm = ConfusionMatrix::new(2);
        cm.add(5, 0);
        cm.add(0, 7);
        assert_eq!(cm.total(), 0);
    }

    #[test]
    fn test_balanced_accuracy_skips_absent_classes() {
        // class 2 never appears in y_true
        let cm = ConfusionMatrix::from_predictions(&[0, 0, 1, 2], &[0, 0, 1, 1], 3);
        assert_relative_eq!(cm.balanced_accuracy(), (1.0 + 0.5) / 2.0);
    }

    #[test]
    fn test_balanced_accuracy_differs_from_accuracy() {
        // 9 majority correct, 1 minority wrong
        let y_true = [0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let y_pred = [0; 10];
        let cm = ConfusionMatrix::from_predictions(&y_pred, &y_true, 2);
        assert_relative_eq!(cm.accuracy(), 0.9);
        assert_relative_eq!(cm.balanced_accuracy(), 0.5);
        assert_eq!(cm.geometric_mean(), 0.0);
    }

    #[test]
    fn test_geometric_mean() {
        let cm = ConfusionMatrix::from_predictions(&[0, 0, 1, 0], &[0, 0, 1, 1], 2);
        assert_relative_eq!(cm.geometric_mean(), (1.0f64 * 0.5).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_matrix_rates() {
        let cm = ConfusionMatrix::new(3);
        assert_eq!(cm.accuracy(), 0.0);
        assert_eq!(cm.balanced_accuracy(), 0.0);
        assert_eq!(cm.geometric_mean(), 0.0);
    }

    #[test]
    fn test_merge() {
        let mut a = ConfusionMatrix::from_predictions(&[0, 1], &[0, 0], 2);
        let b = ConfusionMatrix::from_predictions(&[1], &[1], 2);
        a.merge(&b);
        assert_eq!(a.total(), 3);
        assert_eq!(a.correct(), 2);
    }

    #[test]
    fn test_display() {
        let cm = ConfusionMatrix::from_predictions(&[0, 1], &[0, 1], 2);
        let text = cm.to_string();
        assert!(text.contains("Pred 1"));
        assert!(text.contains("True 0"));
    }
}
