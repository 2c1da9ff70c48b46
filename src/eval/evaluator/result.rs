//! Evaluation report

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics of one evaluation pass, rates in `[0, 1]`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// Mean per-sample loss
    pub loss: f64,
    pub acc: f64,
    /// Mean class accuracy over the most frequent third of the classes
    pub major_acc: f64,
    pub neutral_acc: f64,
    /// Mean class accuracy over the rarest third of the classes
    pub minor_acc: f64,
    /// Macro F1
    pub f1_score: f64,
    /// Geometric mean of per-class recall
    pub gmean: f64,
    pub balanced_accuracy: f64,
    /// Recall of every class, 0 for classes absent from the data
    pub class_acc: Vec<f64>,
    pub num_samples: usize,
}

impl EvalReport {
    /// Unweighted mean of the class accuracies
    pub fn mean_class_acc(&self) -> f64 {
        if self.class_acc.is_empty() {
            return 0.0;
        }
        self.class_acc.iter().sum::<f64>() / self.class_acc.len() as f64
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loss: {:.3} | Acc: {:.3}% | Major: {:.3}% | Neutral: {:.3}% | Minor: {:.3}% | F1: {:.3} | GMean: {:.3} | BalAcc: {:.3}",
            self.loss,
            100.0 * self.acc,
            100.0 * self.major_acc,
            100.0 * self.neutral_acc,
            100.0 * self.minor_acc,
            100.0 * self.f1_score,
            100.0 * self.gmean,
            100.0 * self.balanced_accuracy,
        )
    }
}
