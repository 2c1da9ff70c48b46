//! Reading and writing experiment configurations

use super::schema::ExperimentConfig;
use super::validate::validate_config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Load an experiment configuration from YAML and validate it
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<ExperimentConfig> {
    let config = parse_config(config_path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse YAML without validating, for reporting on broken configs
pub fn parse_config<P: AsRef<Path>>(config_path: P) -> Result<ExperimentConfig> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    serde_yaml::from_str(&yaml_content)
        .map_err(|e| Error::Config(format!("Failed to parse YAML config: {e}")))
}

/// Write a configuration as YAML, creating parent directories
pub fn save_config<P: AsRef<Path>>(config: &ExperimentConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let yaml = serde_yaml::to_string(config)
        .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?;
    fs::write(path, yaml)?;
    Ok(())
}
