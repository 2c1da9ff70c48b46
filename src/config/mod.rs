//! Experiment configuration: YAML schema, validation, and CLI arguments

mod cli;
mod loader;
pub mod schema;
pub mod validate;

pub use cli::{
    apply_overrides, parse_args, Cli, Command, InfoArgs, OutputFormat, TrainArgs, ValidateArgs,
};
pub use loader::{load_config, parse_config, save_config};
pub use schema::{
    DataConfig, ExperimentConfig, GenerationSettings, ImbalanceConfig, LossConfig, ModelConfig,
    OptimConfig, TrainingConfig,
};
pub use validate::{validate_class_counts, validate_config, ValidationError};
