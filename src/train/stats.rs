//! Epoch-level accumulators for generation training

use crate::eval::classification::ConfusionMatrix;
use crate::generate::MixStats;
use crate::io::{load_json, save_json};
use crate::{Result, RATE_EPSILON};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `num / (den + RATE_EPSILON)`, defined for empty denominators
pub fn guarded_rate(num: f64, den: f64) -> f64 {
    num / (den + RATE_EPSILON)
}

/// Running sums over the batches of one epoch
#[derive(Debug, Clone)]
pub struct RunningStats {
    pub other_loss: f64,
    pub gen_loss: f64,
    pub num_other: usize,
    pub correct_other: usize,
    pub num_gen: usize,
    pub correct_gen: usize,
    pub prob_orig: f64,
    pub prob_targ: f64,
    /// Every trained row, original or generated
    confusion: ConfusionMatrix,
}

impl RunningStats {
    pub fn new(num_classes: usize) -> Self {
        Self {
            other_loss: 0.0,
            gen_loss: 0.0,
            num_other: 0,
            correct_other: 0,
            num_gen: 0,
            correct_gen: 0,
            prob_orig: 0.0,
            prob_targ: 0.0,
            confusion: ConfusionMatrix::new(num_classes),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.confusion.n_classes());
    }

    /// Fold in one batch; `labels` are the labels the network was trained on
    pub fn add_batch(&mut self, batch: &MixStats, labels: &[usize]) {
        self.other_loss += batch.other_loss;
        self.gen_loss += batch.gen_loss;
        self.num_other += batch.num_other;
        self.correct_other += batch.correct_other;
        self.num_gen += batch.num_gen;
        self.correct_gen += batch.correct_gen;
        self.prob_orig += batch.prob_orig;
        self.prob_targ += batch.prob_targ;
        self.confusion.extend(&batch.predictions, labels);
    }

    /// Mean loss over original rows
    pub fn train_loss(&self) -> f64 {
        guarded_rate(self.other_loss, self.num_other as f64)
    }

    /// Mean loss over generated rows
    pub fn gen_loss(&self) -> f64 {
        guarded_rate(self.gen_loss, self.num_gen as f64)
    }

    pub fn train_acc(&self) -> f64 {
        guarded_rate(self.correct_other as f64, self.num_other as f64)
    }

    pub fn gen_acc(&self) -> f64 {
        guarded_rate(self.correct_gen as f64, self.num_gen as f64)
    }

    pub fn mean_prob_orig(&self) -> f64 {
        guarded_rate(self.prob_orig, self.num_gen as f64)
    }

    pub fn mean_prob_targ(&self) -> f64 {
        guarded_rate(self.prob_targ, self.num_gen as f64)
    }

    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }
}

/// One epoch of the success table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochSuccess {
    pub epoch: usize,
    /// Per class: `[accepted generations, planned generations]`
    pub table: Vec<[usize; 2]>,
}

impl EpochSuccess {
    /// Accepted / planned for every class
    pub fn rates(&self) -> Vec<f64> {
        self.table
            .iter()
            .map(|&[generated, planned]| guarded_rate(generated as f64, planned as f64))
            .collect()
    }
}

/// Per-class generation success, one table per generation epoch actually run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessTracker {
    num_classes: usize,
    current: Vec<[usize; 2]>,
    history: Vec<EpochSuccess>,
}

impl SuccessTracker {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            current: vec![[0, 0]; num_classes],
            history: Vec::new(),
        }
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Clear the running table
    pub fn begin_epoch(&mut self) {
        self.current = vec![[0, 0]; self.num_classes];
    }

    /// Add one batch's table
    pub fn record(&mut self, batch: &[[usize; 2]]) {
        for (slot, counts) in self.current.iter_mut().zip(batch) {
            slot[0] += counts[0];
            slot[1] += counts[1];
        }
    }

    pub fn current(&self) -> &[[usize; 2]] {
        &self.current
    }

    /// Close the running table under `epoch`
    pub fn finish_epoch(&mut self, epoch: usize) -> &EpochSuccess {
        let entry = EpochSuccess {
            epoch,
            table: std::mem::replace(&mut self.current, vec![[0, 0]; self.num_classes]),
        };
        self.history.retain(|e| e.epoch != epoch);
        self.history.push(entry);
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[EpochSuccess] {
        &self.history
    }

    pub fn last(&self) -> Option<&EpochSuccess> {
        self.history.last()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path)
    }
}
