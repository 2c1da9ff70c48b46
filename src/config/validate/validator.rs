//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::ExperimentConfig;
use crate::train::loss::LossKind;

/// Validate an experiment configuration
///
/// Checks numeric ranges, the loss name, and that the phase switch can be
/// reached from the start epoch. Dataset paths are checked when loading.
pub fn validate_config(config: &ExperimentConfig) -> Result<(), ValidationError> {
    let data = &config.data;
    if data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(data.batch_size));
    }
    if data.num_classes == 0 {
        return Err(ValidationError::EmptyClassCounts);
    }
    if !(data.val_fraction > 0.0 && data.val_fraction < 1.0) {
        return Err(ValidationError::InvalidValFraction(data.val_fraction));
    }
    let channels = data.image_shape.channels;
    if data.mean.len() != channels || data.std.len() != channels {
        return Err(ValidationError::InvalidNormalization(format!(
            "expected {channels} mean/std entries, got {}/{}",
            data.mean.len(),
            data.std.len()
        )));
    }
    if data.std.iter().any(|&s| s <= 0.0 || !s.is_finite()) {
        return Err(ValidationError::InvalidNormalization(
            "standard deviations must be positive".to_string(),
        ));
    }

    let imbalance = &config.imbalance;
    if !(imbalance.ratio >= 1.0) {
        return Err(ValidationError::InvalidImbalanceRatio(imbalance.ratio));
    }
    if imbalance.max_per_class == 0 {
        return Err(ValidationError::EmptyClassCounts);
    }

    if config.model.hidden == 0 {
        return Err(ValidationError::InvalidHiddenWidth(config.model.hidden));
    }

    let optim = &config.optim;
    if optim.lr <= 0.0 || optim.lr > 1.0 {
        return Err(ValidationError::InvalidLearningRate(optim.lr));
    }
    if !(0.0..1.0).contains(&optim.momentum) {
        return Err(ValidationError::InvalidMomentum(optim.momentum));
    }
    if !(optim.weight_decay >= 0.0) {
        return Err(ValidationError::InvalidWeightDecay(optim.weight_decay));
    }

    config.loss.kind.parse::<LossKind>()?;
    if !(0.0..=1.0).contains(&config.loss.effective_beta) {
        return Err(ValidationError::InvalidEffectiveBeta(
            config.loss.effective_beta,
        ));
    }

    let generation = &config.generation;
    if !(0.0..1.0).contains(&generation.beta) {
        return Err(ValidationError::InvalidBeta(generation.beta));
    }
    if !(0.0..=1.0).contains(&generation.gamma) {
        return Err(ValidationError::InvalidGamma(generation.gamma));
    }
    if !(generation.step_size > 0.0) {
        return Err(ValidationError::InvalidStepSize(generation.step_size));
    }
    if !(generation.random_start_radius >= 0.0) {
        return Err(ValidationError::InvalidRadius(
            generation.random_start_radius,
        ));
    }
    if !(0.0..=1.0).contains(&generation.gen_prob) {
        return Err(ValidationError::InvalidProbability(generation.gen_prob));
    }

    let training = &config.training;
    if training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.epochs));
    }
    if training.start_epoch >= training.epochs {
        return Err(ValidationError::InvalidStartEpoch {
            start_epoch: training.start_epoch,
            epochs: training.epochs,
        });
    }
    if training.over && training.warm < training.start_epoch {
        return Err(ValidationError::WarmBeforeStart {
            warm: training.warm,
            start_epoch: training.start_epoch,
        });
    }

    Ok(())
}

/// Check a class-count table against the model's class count
pub fn validate_class_counts(counts: &[usize], num_classes: usize) -> Result<(), ValidationError> {
    if counts.is_empty() {
        return Err(ValidationError::EmptyClassCounts);
    }
    if counts.len() != num_classes {
        return Err(ValidationError::ClassCountMismatch {
            expected: num_classes,
            actual: counts.len(),
        });
    }
    Ok(())
}
