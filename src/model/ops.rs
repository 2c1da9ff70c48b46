//! Row-wise tensor helpers shared by models, losses, and the generator

use ndarray::{Array2, Axis};

/// Row-wise softmax with max subtraction for numerical stability
pub fn softmax(logits: &Array2<f32>) -> Array2<f32> {
    let mut out = logits.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

/// Index of the largest entry of every row
pub fn argmax_rows(values: &Array2<f32>) -> Vec<usize> {
    values
        .axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(best_i, best), (i, &v)| {
                    if v > best {
                        (i, v)
                    } else {
                        (best_i, best)
                    }
                })
                .0
        })
        .collect()
}

/// One-hot encoding, `labels.len() x num_classes`
pub fn one_hot(labels: &[usize], num_classes: usize) -> Array2<f32> {
    let mut out = Array2::zeros((labels.len(), num_classes));
    for (i, &label) in labels.iter().enumerate() {
        out[[i, label]] = 1.0;
    }
    out
}

/// `values[i, labels[i]]` for every row
pub fn gather(values: &Array2<f32>, labels: &[usize]) -> Vec<f32> {
    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| values[[i, label]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let probs = softmax(&array![[1.0, 2.0, 3.0], [0.0, 0.0, 0.0]]);
        for row in probs.axis_iter(Axis(0)) {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-6);
        }
        assert_relative_eq!(probs[[1, 0]], 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let probs = softmax(&array![[1000.0, 1001.0, 1002.0]]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert_relative_eq!(probs.sum(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_argmax_rows() {
        assert_eq!(argmax_rows(&array![[0.1, 0.7, 0.2], [3.0, -1.0, 2.0]]), vec![1, 0]);
    }

    #[test]
    fn test_one_hot_and_gather() {
        let oh = one_hot(&[2, 0], 3);
        assert_eq!(oh, array![[0.0f32, 0.0, 1.0], [1.0, 0.0, 0.0]]);
        assert_eq!(gather(&array![[0.1, 0.2, 0.7], [0.5, 0.3, 0.2]], &[2, 0]), vec![0.7, 0.5]);
    }
}
