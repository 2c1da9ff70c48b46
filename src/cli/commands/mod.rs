//! CLI command implementations

mod info;
mod train;
mod validate;

use crate::cli::LogLevel;
use crate::config::{Cli, Command};
use tracing::debug;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);
    if let Err(e) = crate::logging::init_tracing(log_level.tracing_filter()) {
        debug!("tracing not reinitialised: {e}");
    }

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_args, save_config, ExperimentConfig};
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, config: &ExperimentConfig) -> String {
        let path = dir.path().join("experiment.yaml");
        save_config(config, &path).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_validate_command_ok() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &ExperimentConfig::default());
        let cli = parse_args(["equilibrar", "-q", "validate", &path, "--detailed"]).unwrap();
        assert!(run_command(cli).is_ok());
    }

    #[test]
    fn test_validate_command_reports_invalid() {
        let dir = TempDir::new().unwrap();
        let mut config = ExperimentConfig::default();
        config.generation.beta = 2.0;
        let path = write_config(&dir, &config);
        let cli = parse_args(["equilibrar", "-q", "validate", &path]).unwrap();
        let err = run_command(cli).unwrap_err();
        assert!(err.contains("beta"));
    }

    #[test]
    fn test_train_dry_run() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &ExperimentConfig::default());
        let cli = parse_args(["equilibrar", "-q", "train", &path, "--dry-run"]).unwrap();
        assert!(run_command(cli).is_ok());
    }

    #[test]
    fn test_info_formats() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &ExperimentConfig::default());
        for format in ["text", "json", "yaml"] {
            let cli = parse_args(["equilibrar", "-q", "info", &path, "--format", format]).unwrap();
            assert!(run_command(cli).is_ok());
        }
    }

    #[test]
    fn test_missing_config_fails() {
        let cli = parse_args(["equilibrar", "-q", "info", "/nonexistent.yaml"]).unwrap();
        assert!(run_command(cli).is_err());
    }
}
