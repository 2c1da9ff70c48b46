//! Merging accepted generations into the batch and training on the result

use super::{GenerationPlan, GenerationResult};
use crate::data::{Batch, Normalizer};
use crate::model::ops::{argmax_rows, softmax};
use crate::model::{Backprop, Classifier};
use crate::optim::Optimizer;
use crate::train::loss::Criterion;
use ndarray::Axis;

/// Per-batch diagnostics split into original and generated rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixStats {
    /// Summed per-sample loss over rows that kept their original sample
    pub other_loss: f64,
    /// Summed per-sample loss over rows replaced by a generation
    pub gen_loss: f64,
    pub num_other: usize,
    pub correct_other: usize,
    pub num_gen: usize,
    pub correct_gen: usize,
    /// Summed live-network probability on the seed class, generated rows
    pub prob_orig: f64,
    /// Summed live-network probability on the target class, generated rows
    pub prob_targ: f64,
    /// Per class: `[accepted generations, planned generations]` targeting it
    pub success: Vec<[usize; 2]>,
    /// Live-network prediction for every row of the merged batch
    pub predictions: Vec<usize>,
}

/// Result of one mixed training step
#[derive(Debug, Clone)]
pub struct MixOutcome {
    /// The batch the network was trained on
    pub batch: Batch,
    /// Batch rows that hold generated samples
    pub generated_rows: Vec<usize>,
    pub stats: MixStats,
}

/// Builds the mixed batch and applies one optimizer step to the live network
pub struct BatchMixer<'a> {
    normalizer: &'a Normalizer,
    num_classes: usize,
}

impl<'a> BatchMixer<'a> {
    pub fn new(normalizer: &'a Normalizer, num_classes: usize) -> Self {
        Self {
            normalizer,
            num_classes,
        }
    }

    /// Overwrite the planned rows whose generation was accepted
    ///
    /// Returns the merged batch and the plan positions that were accepted.
    /// All other rows are copied unchanged.
    pub fn merge(
        original: &Batch,
        plan: &GenerationPlan,
        result: &GenerationResult,
    ) -> (Batch, Vec<usize>) {
        let mut merged = original.clone();
        let mut accepted = Vec::new();

        for (k, &ok) in result.accepted.iter().enumerate() {
            if !ok {
                continue;
            }
            let row = plan.indices[k];
            merged
                .images
                .row_mut(row)
                .assign(&result.images.index_axis(Axis(0), k));
            merged.labels[row] = plan.target_labels[k];
            accepted.push(k);
        }

        (merged, accepted)
    }

    /// Merge, then forward/backward/step the live network once
    pub fn train_step<C, O>(
        &self,
        model: &mut C,
        optimizer: &mut O,
        criterion: &dyn Criterion,
        original: &Batch,
        plan: &GenerationPlan,
        result: &GenerationResult,
    ) -> MixOutcome
    where
        C: Classifier + ?Sized,
        O: Optimizer + ?Sized,
    {
        let (batch, accepted) = Self::merge(original, plan, result);

        optimizer.zero_grad(&mut model.parameters_mut());
        let logits = model.forward(&self.normalizer.normalize(&batch.images)).logits;
        let loss = criterion.forward(&logits, &batch.labels);
        model.backward(&loss.mean_grad(), Backprop::Full);
        optimizer.step(&mut model.parameters_mut());

        let predictions = argmax_rows(&logits);
        let probs = softmax(&logits);
        let generated_rows: Vec<usize> = accepted.iter().map(|&k| plan.indices[k]).collect();

        let mut is_generated = vec![false; batch.size()];
        for &row in &generated_rows {
            is_generated[row] = true;
        }

        let mut stats = MixStats {
            success: vec![[0, 0]; self.num_classes],
            ..MixStats::default()
        };
        for (row, &generated) in is_generated.iter().enumerate() {
            let correct = usize::from(predictions[row] == batch.labels[row]);
            let row_loss = f64::from(loss.losses[row]);
            if generated {
                stats.gen_loss += row_loss;
                stats.num_gen += 1;
                stats.correct_gen += correct;
            } else {
                stats.other_loss += row_loss;
                stats.num_other += 1;
                stats.correct_other += correct;
            }
        }

        for &k in &accepted {
            let row = plan.indices[k];
            stats.prob_orig += f64::from(probs[[row, plan.seed_labels[k]]]);
            stats.prob_targ += f64::from(probs[[row, plan.target_labels[k]]]);
            if let Some(slot) = stats.success.get_mut(plan.target_labels[k]) {
                slot[0] += 1;
            }
        }
        for &target in &plan.target_labels {
            if let Some(slot) = stats.success.get_mut(target) {
                slot[1] += 1;
            }
        }
        stats.predictions = predictions;

        MixOutcome {
            batch,
            generated_rows,
            stats,
        }
    }
}
