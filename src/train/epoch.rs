//! One training epoch, with or without generation

use super::loss::Criterion;
use super::stats::{RunningStats, SuccessTracker};
use crate::data::{Batch, Normalizer};
use crate::generate::{
    AcceptanceSampler, BatchMixer, GenerationConfig, GenerationRequest, MixOutcome, MixStats,
    SampleGenerator,
};
use crate::model::ops::argmax_rows;
use crate::model::{Backprop, Classifier, Mode};
use crate::optim::Optimizer;
use ndarray::Axis;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Epoch-level rates, all in `[0, 1]`
///
/// Generation-branch rates are `0` when nothing was generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochResult {
    /// Mean loss over original rows
    pub train_loss: f64,
    /// Mean loss over generated rows
    pub gen_loss: f64,
    pub train_acc: f64,
    pub gen_acc: f64,
    /// Mean live-network probability on the seed class of generated rows
    pub prob_orig: f64,
    /// Mean live-network probability on the target class of generated rows
    pub prob_targ: f64,
    pub balanced_accuracy: f64,
    pub geometric_mean: f64,
    pub correct_other: usize,
    pub num_other: usize,
    pub correct_gen: usize,
    pub num_gen: usize,
    /// Per class: `[accepted generations, planned generations]`
    pub success: Vec<[usize; 2]>,
    pub num_batches: usize,
}

impl EpochResult {
    pub fn from_stats(stats: &RunningStats, success: Vec<[usize; 2]>, num_batches: usize) -> Self {
        Self {
            train_loss: stats.train_loss(),
            gen_loss: stats.gen_loss(),
            train_acc: stats.train_acc(),
            gen_acc: stats.gen_acc(),
            prob_orig: stats.mean_prob_orig(),
            prob_targ: stats.mean_prob_targ(),
            balanced_accuracy: stats.confusion().balanced_accuracy(),
            geometric_mean: stats.confusion().geometric_mean(),
            correct_other: stats.correct_other,
            num_other: stats.num_other,
            correct_gen: stats.correct_gen,
            num_gen: stats.num_gen,
            success,
            num_batches,
        }
    }

    /// One-line summary of a generation epoch
    pub fn summary(&self) -> String {
        format!(
            "t_Loss: {:.3} | g_Loss: {:.3} | Acc: {:.3}% ({}/{}) | Acc_gen: {:.3}% ({}/{}) | Prob_orig: {:.3} | Prob_targ: {:.3}",
            self.train_loss,
            self.gen_loss,
            100.0 * self.train_acc,
            self.correct_other,
            self.num_other,
            100.0 * self.gen_acc,
            self.correct_gen,
            self.num_gen,
            self.prob_orig,
            self.prob_targ,
        )
    }

    /// One-line summary of a plain epoch
    pub fn plain_summary(&self) -> String {
        format!(
            "Loss: {:.3} | Acc: {:.3}% ({}/{}) | GMean: {:.3} | BalAcc: {:.3}",
            self.train_loss,
            100.0 * self.train_acc,
            self.correct_other,
            self.num_other,
            100.0 * self.geometric_mean,
            100.0 * self.balanced_accuracy,
        )
    }
}

/// Drives sampler, generator and mixer over the batches of an epoch
pub struct EpochOrchestrator<'a> {
    sampler: &'a AcceptanceSampler,
    generator: SampleGenerator<'a>,
    mixer: BatchMixer<'a>,
}

impl<'a> EpochOrchestrator<'a> {
    pub fn new(
        sampler: &'a AcceptanceSampler,
        config: &'a GenerationConfig,
        normalizer: &'a Normalizer,
    ) -> Self {
        Self {
            sampler,
            generator: SampleGenerator::new(config, normalizer),
            mixer: BatchMixer::new(normalizer, sampler.stats().num_classes()),
        }
    }

    /// Plan, generate, and train on one batch
    pub fn run_batch<L, S, O, R>(
        &self,
        live: &mut L,
        seed: &mut S,
        optimizer: &mut O,
        criterion: &dyn Criterion,
        batch: &Batch,
        rng: &mut R,
    ) -> MixOutcome
    where
        L: Classifier + ?Sized,
        S: Classifier + ?Sized,
        O: Optimizer + ?Sized,
        R: Rng,
    {
        let plan = self.sampler.plan(&batch.labels, rng);
        let seeds = batch.images.select(Axis(0), &plan.seed_indices);
        let request = GenerationRequest {
            seeds: &seeds,
            seed_labels: &plan.seed_labels,
            target_labels: &plan.target_labels,
            accept_probs: &plan.accept_probs,
        };
        let result =
            self.generator
                .generate(seed, live, &request, self.sampler.acceptance_rule(), rng);

        self.mixer
            .train_step(live, optimizer, criterion, batch, &plan, &result)
    }

    /// Train `live` for one epoch with generation
    ///
    /// `tracker` is reset at the start and holds this epoch's success table
    /// when the call returns; closing it under an epoch index is left to the
    /// caller.
    #[allow(clippy::too_many_arguments)]
    pub fn run_epoch<L, S, O, I, R>(
        &self,
        live: &mut L,
        seed: &mut S,
        optimizer: &mut O,
        criterion: &dyn Criterion,
        batches: I,
        tracker: &mut SuccessTracker,
        rng: &mut R,
    ) -> EpochResult
    where
        L: Classifier + ?Sized,
        S: Classifier + ?Sized,
        O: Optimizer + ?Sized,
        I: IntoIterator<Item = Batch>,
        R: Rng,
    {
        live.set_mode(Mode::Train);
        seed.set_mode(Mode::Eval);
        tracker.begin_epoch();

        let mut stats = RunningStats::new(live.num_classes());
        let mut num_batches = 0;

        for (i, batch) in batches.into_iter().enumerate() {
            let outcome = self.run_batch(live, seed, optimizer, criterion, &batch, rng);
            debug!(
                batch = i,
                generated = outcome.stats.num_gen,
                kept = outcome.stats.num_other,
                "generation batch"
            );
            stats.add_batch(&outcome.stats, &outcome.batch.labels);
            tracker.record(&outcome.stats.success);
            num_batches += 1;
        }

        let result = EpochResult::from_stats(&stats, tracker.current().to_vec(), num_batches);
        info!("{}", result.summary());
        result
    }
}

/// Standard mini-batch training on the batches as given
pub fn train_plain_epoch<C, O, I>(
    model: &mut C,
    optimizer: &mut O,
    criterion: &dyn Criterion,
    normalizer: &Normalizer,
    batches: I,
) -> EpochResult
where
    C: Classifier + ?Sized,
    O: Optimizer + ?Sized,
    I: IntoIterator<Item = Batch>,
{
    model.set_mode(Mode::Train);
    let mut stats = RunningStats::new(model.num_classes());
    let mut num_batches = 0;

    for batch in batches {
        optimizer.zero_grad(&mut model.parameters_mut());
        let logits = model.forward(&normalizer.normalize(&batch.images)).logits;
        let loss = criterion.forward(&logits, &batch.labels);
        model.backward(&loss.mean_grad(), Backprop::Full);
        optimizer.step(&mut model.parameters_mut());

        let predictions = argmax_rows(&logits);
        let correct = predictions
            .iter()
            .zip(&batch.labels)
            .filter(|(p, l)| p == l)
            .count();
        let batch_stats = MixStats {
            other_loss: f64::from(loss.sum()),
            num_other: batch.size(),
            correct_other: correct,
            predictions,
            ..MixStats::default()
        };
        stats.add_batch(&batch_stats, &batch.labels);
        num_batches += 1;
    }

    let result = EpochResult::from_stats(&stats, Vec::new(), num_batches);
    info!("{}", result.plain_summary());
    result
}
