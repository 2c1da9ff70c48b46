//! CLI argument parsing
//!
//! ```bash
//! equilibrar train experiment.yaml
//! equilibrar train experiment.yaml --epochs 20 --seed 3 --output-dir ./runs
//! equilibrar validate experiment.yaml
//! equilibrar info experiment.yaml --format json
//! ```

mod core;
mod types;

pub use core::{apply_overrides, parse_args, Cli, Command, InfoArgs, TrainArgs, ValidateArgs};
pub use types::OutputFormat;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExperimentConfig;
    use std::path::PathBuf;

    fn train_args() -> TrainArgs {
        TrainArgs {
            config: PathBuf::from("experiment.yaml"),
            output_dir: None,
            resume: None,
            epochs: None,
            lr: None,
            seed: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_parse_train_command() {
        let cli = parse_args(["equilibrar", "train", "experiment.yaml"]).unwrap();
        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.config, PathBuf::from("experiment.yaml"));
                assert!(!args.dry_run);
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_parse_train_with_overrides() {
        let cli = parse_args([
            "equilibrar",
            "train",
            "experiment.yaml",
            "--epochs",
            "10",
            "--lr",
            "0.05",
            "--seed",
            "7",
            "--output-dir",
            "./output",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.epochs, Some(10));
                assert!((args.lr.unwrap() - 0.05).abs() < 1e-6);
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.output_dir, Some(PathBuf::from("./output")));
                assert!(args.dry_run);
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_parse_validate_and_info() {
        let cli = parse_args(["equilibrar", "validate", "experiment.yaml", "--detailed"]).unwrap();
        assert!(matches!(cli.command, Command::Validate(ValidateArgs { detailed: true, .. })));

        let cli = parse_args(["equilibrar", "info", "experiment.yaml", "--format", "yaml"]).unwrap();
        match cli.command {
            Command::Info(args) => assert_eq!(args.format, OutputFormat::Yaml),
            _ => panic!("Expected Info command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = parse_args(["equilibrar", "-v", "train", "experiment.yaml"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);

        let cli = parse_args(["equilibrar", "--quiet", "info", "experiment.yaml"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_missing_config_and_unknown_command() {
        assert!(parse_args(["equilibrar", "train"]).is_err());
        assert!(parse_args(["equilibrar", "quantize"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = ExperimentConfig::default();
        let args = TrainArgs {
            output_dir: Some(PathBuf::from("./custom")),
            resume: Some(PathBuf::from("ckpt_0.json")),
            epochs: Some(50),
            lr: Some(0.01),
            seed: Some(42),
            ..train_args()
        };
        apply_overrides(&mut config, &args);
        assert_eq!(config.training.output_dir, PathBuf::from("./custom"));
        assert_eq!(config.training.resume, Some(PathBuf::from("ckpt_0.json")));
        assert_eq!(config.training.epochs, 50);
        assert!((config.optim.lr - 0.01).abs() < 1e-8);
        assert_eq!(config.training.seed, 42);
    }

    #[test]
    fn test_apply_no_overrides_keeps_config() {
        let mut config = ExperimentConfig::default();
        apply_overrides(&mut config, &train_args());
        assert_eq!(config, ExperimentConfig::default());
    }

    #[test]
    fn test_output_format_case_insensitive() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
