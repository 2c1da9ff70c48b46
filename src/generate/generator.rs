//! Iterative translation of seed images toward target classes

use super::perturb::{clamp_unit, make_step, random_perturb, StepNorm};
use crate::data::Normalizer;
use crate::model::ops::{gather, one_hot, softmax};
use crate::model::{Backprop, Classifier, InferenceGuard};
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Hyperparameters of the generation search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Minimum seed-network probability on the target class
    pub gamma: f64,
    /// Weight of the live network's seed-class logit in the objective
    pub lambda: f32,
    pub step_size: f32,
    pub iterations: usize,
    pub random_start: bool,
    pub random_start_radius: f32,
    pub step_norm: StepNorm,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            lambda: 0.5,
            step_size: 0.1,
            iterations: 10,
            random_start: true,
            random_start_radius: 0.5,
            step_norm: StepNorm::L2,
        }
    }
}

/// How a finished generation is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceRule {
    /// `p_target >= gamma` and a Bernoulli draw with the sample's probability
    ConfidenceAndBernoulli,
    /// The Bernoulli draw alone
    BernoulliOnly,
}

/// Seeds and targets for one generation call
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// `n x D` images in `[0, 1]`
    pub seeds: &'a Array2<f32>,
    pub seed_labels: &'a [usize],
    pub target_labels: &'a [usize],
    pub accept_probs: &'a [f64],
}

impl GenerationRequest<'_> {
    pub fn len(&self) -> usize {
        self.seeds.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.nrows() == 0
    }
}

/// Generated images with their acceptance decisions
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub images: Array2<f32>,
    pub accepted: Vec<bool>,
    /// Seed-network probability on the target class after the last step
    pub target_probs: Vec<f32>,
}

impl GenerationResult {
    pub fn num_accepted(&self) -> usize {
        self.accepted.iter().filter(|&&a| a).count()
    }
}

/// Gradient-descent image translation steered by a seed network
///
/// Minimises `CE(seed(x), target) + lambda * mean(live(x)[seed_label])` over
/// the images, keeping them in `[0, 1]`.
pub struct SampleGenerator<'a> {
    config: &'a GenerationConfig,
    normalizer: &'a Normalizer,
}

impl<'a> SampleGenerator<'a> {
    pub fn new(config: &'a GenerationConfig, normalizer: &'a Normalizer) -> Self {
        Self { config, normalizer }
    }

    pub fn config(&self) -> &GenerationConfig {
        self.config
    }

    /// Run the search and decide acceptance
    ///
    /// Both networks are held in eval mode for the duration of the call and
    /// returned to their previous modes afterwards.
    pub fn generate<S, L, R>(
        &self,
        seed_net: &mut S,
        live_net: &mut L,
        request: &GenerationRequest<'_>,
        rule: AcceptanceRule,
        rng: &mut R,
    ) -> GenerationResult
    where
        S: Classifier + ?Sized,
        L: Classifier + ?Sized,
        R: Rng,
    {
        let n = request.len();
        let mut images = request.seeds.clone();
        if n == 0 {
            return GenerationResult {
                images,
                accepted: Vec::new(),
                target_probs: Vec::new(),
            };
        }

        let mut seed = InferenceGuard::new(seed_net);
        let mut live = InferenceGuard::new(live_net);

        if self.config.random_start {
            let cols = images.ncols();
            images += &random_perturb(
                n,
                cols,
                self.config.step_norm,
                self.config.random_start_radius,
                rng,
            );
            clamp_unit(&mut images);
        }

        let scale = 1.0 / n as f32;
        let target_one_hot = one_hot(request.target_labels, seed.num_classes());
        let seed_class_grad =
            one_hot(request.seed_labels, live.num_classes()) * (self.config.lambda * scale);

        for iteration in 0..self.config.iterations {
            let normalized = self.normalizer.normalize(&images);

            let seed_logits = seed.forward(&normalized).logits;
            let ce_grad = (softmax(&seed_logits) - &target_one_hot) * scale;
            let mut grad = seed.backward(&ce_grad, Backprop::InputOnly);

            live.forward(&normalized);
            grad += &live.backward(&seed_class_grad, Backprop::InputOnly);

            let grad = self.normalizer.backward(&grad);
            images -= &make_step(&grad, self.config.step_norm, self.config.step_size);
            clamp_unit(&mut images);

            trace!(iteration, "generation step");
        }

        let probs = softmax(&seed.forward(&self.normalizer.normalize(&images)).logits);
        let target_probs = gather(&probs, request.target_labels);

        let accepted = target_probs
            .iter()
            .zip(request.accept_probs)
            .map(|(&p_target, &p_accept)| {
                let draw = rng.random_bool(p_accept.clamp(0.0, 1.0));
                match rule {
                    AcceptanceRule::BernoulliOnly => draw,
                    AcceptanceRule::ConfidenceAndBernoulli => {
                        f64::from(p_target) >= self.config.gamma && draw
                    }
                }
            })
            .collect();

        GenerationResult {
            images,
            accepted,
            target_probs,
        }
    }
}
