//! Info command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{parse_config, InfoArgs, OutputFormat};

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let config = parse_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, "Configuration Info:");
            println!();
            println!(
                "Classes: {} | Imbalance: {:?} (ratio {})",
                config.data.num_classes, config.imbalance.kind, config.imbalance.ratio
            );
            println!("Loss: {}", config.loss.kind);
            println!(
                "Optimizer: sgd (lr={}, momentum={})",
                config.optim.lr, config.optim.momentum
            );
            println!(
                "Epochs: {} (warm {})",
                config.training.epochs, config.training.warm
            );
            println!("Batch size: {}", config.data.batch_size);
            if config.generation.enabled {
                println!("Generation: enabled");
            }
            if config.training.over {
                println!("Over-sampling: enabled");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}
