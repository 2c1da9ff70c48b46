//! Evaluator over a dataset

use super::result::EvalReport;
use crate::data::{ClassGroup, ClassStatistics, Dataset, Normalizer};
use crate::eval::classification::{ConfusionMatrix, MultiClassMetrics};
use crate::model::ops::argmax_rows;
use crate::model::{Classifier, InferenceGuard};
use crate::train::loss::Criterion;

/// Evaluates a classifier in eval mode, grouping classes by training frequency
pub struct Evaluator<'a> {
    normalizer: &'a Normalizer,
    groups: Vec<ClassGroup>,
    batch_size: usize,
}

impl<'a> Evaluator<'a> {
    /// `train_stats` decides which classes count as major, neutral, or minor
    pub fn new(normalizer: &'a Normalizer, train_stats: &ClassStatistics, batch_size: usize) -> Self {
        Self {
            normalizer,
            groups: train_stats.class_groups(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn groups(&self) -> &[ClassGroup] {
        &self.groups
    }

    /// Run the model over `dataset` without touching its parameters
    pub fn evaluate<C>(&self, model: &mut C, dataset: &Dataset, criterion: &dyn Criterion) -> EvalReport
    where
        C: Classifier + ?Sized,
    {
        let mut model = InferenceGuard::new(model);
        let num_classes = model.num_classes();
        let mut confusion = ConfusionMatrix::new(num_classes);
        let mut loss_sum = 0.0f64;

        let indices: Vec<usize> = (0..dataset.len()).collect();
        for chunk in indices.chunks(self.batch_size) {
            let batch = dataset.batch(chunk);
            let logits = model.forward(&self.normalizer.normalize(&batch.images)).logits;
            loss_sum += f64::from(criterion.forward(&logits, &batch.labels).sum());
            confusion.extend(&argmax_rows(&logits), &batch.labels);
        }

        let class_acc: Vec<f64> = (0..num_classes)
            .map(|c| confusion.recall(c).unwrap_or(0.0))
            .collect();
        let metrics = MultiClassMetrics::from_confusion_matrix(&confusion);
        let total = confusion.total();

        EvalReport {
            loss: if total == 0 { 0.0 } else { loss_sum / total as f64 },
            acc: confusion.accuracy(),
            major_acc: self.group_accuracy(&confusion, ClassGroup::Major),
            neutral_acc: self.group_accuracy(&confusion, ClassGroup::Neutral),
            minor_acc: self.group_accuracy(&confusion, ClassGroup::Minor),
            f1_score: metrics.macro_f1(),
            gmean: confusion.geometric_mean(),
            balanced_accuracy: confusion.balanced_accuracy(),
            class_acc,
            num_samples: total,
        }
    }

    /// Mean recall of the group's classes present in the data
    fn group_accuracy(&self, confusion: &ConfusionMatrix, group: ClassGroup) -> f64 {
        let recalls: Vec<f64> = self
            .groups
            .iter()
            .enumerate()
            .filter(|&(_, &g)| g == group)
            .filter_map(|(c, _)| confusion.recall(c))
            .collect();
        if recalls.is_empty() {
            0.0
        } else {
            recalls.iter().sum::<f64>() / recalls.len() as f64
        }
    }
}
