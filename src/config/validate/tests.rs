//! Unit tests for configuration validation

use super::error::ValidationError;
use super::validator::{validate_class_counts, validate_config};
use crate::config::schema::*;

fn create_valid_config() -> ExperimentConfig {
    let mut config = ExperimentConfig::default();
    config.data.batch_size = 16;
    config.training.epochs = 10;
    config.training.warm = 5;
    config
}

#[test]
fn test_valid_config() {
    assert!(validate_config(&create_valid_config()).is_ok());
    assert!(validate_config(&ExperimentConfig::default()).is_ok());
}

#[test]
fn test_invalid_batch_size() {
    let mut config = create_valid_config();
    config.data.batch_size = 0;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidBatchSize(0)));
}

#[test]
fn test_invalid_learning_rate() {
    let mut config = create_valid_config();
    config.optim.lr = 0.0;
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidLearningRate(_)));
}

#[test]
fn test_invalid_loss_type() {
    let mut config = create_valid_config();
    config.loss.kind = "hinge".to_string();
    let err = validate_config(&config).unwrap_err();
    assert_eq!(err, ValidationError::InvalidLossType("hinge".to_string()));
    assert!(err.to_string().contains("ce, focal, ldam"));
}

#[test]
fn test_loss_type_aliases_accepted() {
    for name in ["ce", "CE", "cross_entropy", "focal", "LDAM"] {
        let mut config = create_valid_config();
        config.loss.kind = name.to_string();
        assert!(validate_config(&config).is_ok(), "{name} rejected");
    }
}

#[test]
fn test_beta_range() {
    let mut config = create_valid_config();
    config.generation.beta = 1.0;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidBeta(_))
    ));
    config.generation.beta = 0.0;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_gamma_range() {
    let mut config = create_valid_config();
    config.generation.gamma = 1.5;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidGamma(_))
    ));
    config.generation.gamma = 1.0;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_non_positive_step_size() {
    let mut config = create_valid_config();
    config.generation.step_size = 0.0;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidStepSize(_))
    ));
}

#[test]
fn test_gen_prob_range() {
    let mut config = create_valid_config();
    config.generation.gen_prob = -0.1;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidProbability(_))
    ));
}

#[test]
fn test_zero_epochs() {
    let mut config = create_valid_config();
    config.training.epochs = 0;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidEpochs(0))
    ));
}

#[test]
fn test_warm_before_start_with_oversampling() {
    let mut config = create_valid_config();
    config.training.start_epoch = 7;
    config.training.warm = 5;
    config.training.over = true;
    assert_eq!(
        validate_config(&config).unwrap_err(),
        ValidationError::WarmBeforeStart {
            warm: 5,
            start_epoch: 7
        }
    );

    config.training.over = false;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_start_epoch_past_end() {
    let mut config = create_valid_config();
    config.training.start_epoch = 10;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidStartEpoch { .. })
    ));
}

#[test]
fn test_normalisation_length() {
    let mut config = create_valid_config();
    config.data.mean = vec![0.5];
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidNormalization(_))
    ));
}

#[test]
fn test_imbalance_ratio_below_one() {
    let mut config = create_valid_config();
    config.imbalance.ratio = 0.5;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidImbalanceRatio(_))
    ));
}

#[test]
fn test_class_counts() {
    assert!(validate_class_counts(&[10, 5, 1], 3).is_ok());
    assert_eq!(
        validate_class_counts(&[], 3),
        Err(ValidationError::EmptyClassCounts)
    );
    assert_eq!(
        validate_class_counts(&[10, 5], 3),
        Err(ValidationError::ClassCountMismatch {
            expected: 3,
            actual: 2
        })
    );
}
