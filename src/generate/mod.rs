//! Minority-sample generation by translating majority images
//!
//! Per batch: [`AcceptanceSampler`] plans which rows to regenerate from which
//! seeds, [`SampleGenerator`] perturbs the seeds toward their targets and
//! decides acceptance, and [`BatchMixer`] swaps accepted generations into the
//! batch and trains the live network on it.

mod generator;
mod mixer;
mod perturb;
mod sampler;

pub use generator::{
    AcceptanceRule, GenerationConfig, GenerationRequest, GenerationResult, SampleGenerator,
};
pub use mixer::{BatchMixer, MixOutcome, MixStats};
pub use perturb::{clamp_unit, make_step, random_perturb, StepNorm, NORM_EPSILON};
pub use sampler::{AcceptanceSampler, GenerationPlan, TargetingMode};
