//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use proptest::prelude::*;

fn arb_valid_config() -> impl Strategy<Value = ExperimentConfig> {
    (
        1usize..256,   // batch_size
        1e-6f32..1.0,  // lr
        1usize..300,   // epochs
        0.0f64..0.9999, // beta
        0.0f64..=1.0,  // gamma
        1e-4f32..2.0,  // step_size
    )
        .prop_map(|(batch_size, lr, epochs, beta, gamma, step_size)| {
            let mut config = ExperimentConfig::default();
            config.data.batch_size = batch_size;
            config.optim.lr = lr;
            config.training.epochs = epochs;
            config.training.warm = epochs / 2;
            config.generation.beta = beta;
            config.generation.gamma = gamma;
            config.generation.step_size = step_size;
            config
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_config_passes(config in arb_valid_config()) {
        prop_assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn prop_zero_batch_size_fails(config in arb_valid_config()) {
        let mut config = config;
        config.data.batch_size = 0;
        prop_assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn prop_beta_at_or_above_one_fails(config in arb_valid_config(), beta in 1.0f64..10.0) {
        let mut config = config;
        config.generation.beta = beta;
        prop_assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidBeta(_))
        ));
    }

    #[test]
    fn prop_warm_before_start_fails_when_oversampling(
        config in arb_valid_config(),
        gap in 1usize..50,
    ) {
        let mut config = config;
        config.training.epochs = 400;
        config.training.warm = 100;
        config.training.start_epoch = 100 + gap;
        config.training.over = true;
        let is_warm_error = matches!(
            validate_config(&config),
            Err(ValidationError::WarmBeforeStart { .. })
        );
        prop_assert!(is_warm_error);
    }
}
