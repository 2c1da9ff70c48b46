//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, validate_config, TrainArgs};
use crate::train::Runner;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Equilibrar: Training from {}", args.config.display()),
    );

    let mut config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut config, &args);
    validate_config(&config).map_err(|e| format!("Config error: {e}"))?;

    if args.dry_run {
        log(
            level,
            LogLevel::Normal,
            "Dry run - config validated successfully",
        );
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  Loss: {} | Imbalance: {:?} (ratio {})",
                config.loss.kind, config.imbalance.kind, config.imbalance.ratio
            ),
        );
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  Epochs: {} (warm {}) | lr {}",
                config.training.epochs, config.training.warm, config.optim.lr
            ),
        );
        return Ok(());
    }

    let mut runner = Runner::from_config(config).map_err(|e| format!("Setup error: {e}"))?;
    let summary = runner.run().map_err(|e| format!("Training error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training complete! Best validation balanced accuracy: {:.3}%",
            100.0 * summary.best_val_bal_acc
        ),
    );
    if let Some(test) = &summary.test {
        log(level, LogLevel::Normal, &format!("  Test: {test}"));
    }
    log(
        level,
        LogLevel::Verbose,
        &format!("  Artifacts: {}", summary.run_dir.display()),
    );
    Ok(())
}
