//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{parse_config, validate_config, ExperimentConfig, ValidateArgs};

/// Format the data and imbalance sections
pub fn format_data_info(config: &ExperimentConfig) -> String {
    let data = &config.data;
    let mut lines = Vec::new();
    match (&data.train_path, &data.test_path) {
        (Some(train), Some(test)) => {
            lines.push(format!("  Training data: {}", train.display()));
            lines.push(format!("  Held-out data: {}", test.display()));
        }
        _ => lines.push(format!(
            "  Synthetic data: {} classes, {}x{}x{}",
            data.num_classes,
            data.image_shape.channels,
            data.image_shape.height,
            data.image_shape.width
        )),
    }
    lines.push(format!(
        "  Imbalance: {:?} (ratio {}, max {} per class)",
        config.imbalance.kind, config.imbalance.ratio, config.imbalance.max_per_class
    ));
    lines.push(format!("  Batch size: {}", data.batch_size));
    lines.join("\n")
}

/// Format the generation section
pub fn format_generation_info(config: &ExperimentConfig) -> String {
    let generation = &config.generation;
    if !generation.enabled {
        return "  Generation: disabled".to_string();
    }
    [
        format!("  Generation: from epoch {}", config.training.warm),
        format!(
            "    beta {} | gamma {} | lambda {}",
            generation.beta, generation.gamma, generation.lambda
        ),
        format!(
            "    step {} x {} ({:?})",
            generation.step_size, generation.attack_iter, generation.step_norm
        ),
    ]
    .join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    let config = parse_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    validate_config(&config).map_err(|e| format!("Validation failed: {e}"))?;

    log(level, LogLevel::Normal, "✓ Configuration is valid");
    if args.detailed {
        log(level, LogLevel::Normal, &format_data_info(&config));
        log(level, LogLevel::Normal, &format_generation_info(&config));
    }
    Ok(())
}
