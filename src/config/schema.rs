//! YAML schema of an experiment
//!
//! Every field has a default, so a minimal file only names what it changes:
//!
//! ```yaml
//! imbalance:
//!   type: long_tail
//!   ratio: 100
//! training:
//!   epochs: 200
//!   warm: 160
//! ```

use crate::data::{ImageShape, ImbalanceType};
use crate::generate::{GenerationConfig, StepNorm};
use crate::train::loss::LossSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete experiment configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub imbalance: ImbalanceConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub optim: OptimConfig,
    #[serde(default)]
    pub loss: LossConfig,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub training: TrainingConfig,
}

/// Where samples come from and how they are batched
///
/// Without `train_path` a synthetic class-conditional dataset is generated
/// with `num_classes` classes following the imbalance profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON dataset to draw the imbalanced training set from
    #[serde(default)]
    pub train_path: Option<PathBuf>,

    /// JSON dataset split into validation and test sets
    #[serde(default)]
    pub test_path: Option<PathBuf>,

    #[serde(default = "default_num_classes")]
    pub num_classes: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default)]
    pub image_shape: ImageShape,

    /// Per-channel normalisation mean
    #[serde(default = "default_mean")]
    pub mean: Vec<f32>,

    /// Per-channel normalisation standard deviation
    #[serde(default = "default_std")]
    pub std: Vec<f32>,

    /// Share of the held-out set used for model selection
    #[serde(default = "default_val_fraction")]
    pub val_fraction: f64,

    /// Samples per class of the held-out set (synthetic data only)
    #[serde(default = "default_test_per_class")]
    pub test_per_class: usize,

    /// Pixel noise of synthetic samples
    #[serde(default = "default_synthetic_noise")]
    pub synthetic_noise: f32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            train_path: None,
            test_path: None,
            num_classes: default_num_classes(),
            batch_size: default_batch_size(),
            image_shape: ImageShape::default(),
            mean: default_mean(),
            std: default_std(),
            val_fraction: default_val_fraction(),
            test_per_class: default_test_per_class(),
            synthetic_noise: default_synthetic_noise(),
        }
    }
}

/// Class-count schedule of the training set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImbalanceConfig {
    #[serde(rename = "type", default)]
    pub kind: ImbalanceType,

    /// Head-to-tail count ratio
    #[serde(default = "default_ratio")]
    pub ratio: f64,

    #[serde(default = "default_max_per_class")]
    pub max_per_class: usize,
}

impl Default for ImbalanceConfig {
    fn default() -> Self {
        Self {
            kind: ImbalanceType::None,
            ratio: default_ratio(),
            max_per_class: default_max_per_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_hidden")]
    pub hidden: usize,

    #[serde(default = "default_true")]
    pub batch_norm: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden: default_hidden(),
            batch_norm: true,
        }
    }
}

/// SGD and its warm-up/step learning-rate schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimConfig {
    #[serde(default = "default_lr")]
    pub lr: f32,

    #[serde(default = "default_momentum")]
    pub momentum: f32,

    #[serde(default = "default_weight_decay")]
    pub weight_decay: f32,

    #[serde(default = "default_warmup_epochs")]
    pub warmup_epochs: usize,

    #[serde(default = "default_milestones")]
    pub milestones: Vec<usize>,

    /// Factor applied once per passed milestone
    #[serde(default = "default_lr_decay")]
    pub lr_decay: f32,
}

impl Default for OptimConfig {
    fn default() -> Self {
        Self {
            lr: default_lr(),
            momentum: default_momentum(),
            weight_decay: default_weight_decay(),
            warmup_epochs: default_warmup_epochs(),
            milestones: default_milestones(),
            lr_decay: default_lr_decay(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossConfig {
    /// One of `ce`, `focal`, `ldam`
    #[serde(rename = "type", default = "default_loss_type")]
    pub kind: String,

    #[serde(default = "default_focal_gamma")]
    pub focal_gamma: f32,

    #[serde(default = "default_ldam_max_margin")]
    pub ldam_max_margin: f32,

    #[serde(default = "default_ldam_scale")]
    pub ldam_scale: f32,

    /// Re-weight classes by effective number of samples from the warm epoch
    #[serde(default)]
    pub cost_sensitive: bool,

    #[serde(default = "default_effective_beta")]
    pub effective_beta: f64,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            kind: default_loss_type(),
            focal_gamma: default_focal_gamma(),
            ldam_max_margin: default_ldam_max_margin(),
            ldam_scale: default_ldam_scale(),
            cost_sensitive: false,
            effective_beta: default_effective_beta(),
        }
    }
}

impl LossConfig {
    pub fn settings(&self) -> LossSettings {
        LossSettings {
            focal_gamma: self.focal_gamma,
            ldam_max_margin: self.ldam_max_margin,
            ldam_scale: self.ldam_scale,
        }
    }
}

/// Major-to-minor generation hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Generation epochs start at `training.warm`; disabled runs train plainly
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seed-selection discount
    #[serde(default = "default_beta")]
    pub beta: f64,

    /// Confidence threshold on the target class
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    #[serde(default = "default_lambda")]
    pub lambda: f32,

    #[serde(default = "default_step_size")]
    pub step_size: f32,

    #[serde(default = "default_attack_iter")]
    pub attack_iter: usize,

    #[serde(default = "default_true")]
    pub random_start: bool,

    #[serde(default = "default_random_start_radius")]
    pub random_start_radius: f32,

    #[serde(default)]
    pub step_norm: StepNorm,

    /// Acceptance probability on balanced data
    #[serde(default = "default_gen_prob")]
    pub gen_prob: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            beta: default_beta(),
            gamma: default_gamma(),
            lambda: default_lambda(),
            step_size: default_step_size(),
            attack_iter: default_attack_iter(),
            random_start: true,
            random_start_radius: default_random_start_radius(),
            step_norm: StepNorm::L2,
            gen_prob: default_gen_prob(),
        }
    }
}

impl GenerationSettings {
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            gamma: self.gamma,
            lambda: self.lambda,
            step_size: self.step_size,
            iterations: self.attack_iter,
            random_start: self.random_start,
            random_start_radius: self.random_start_radius,
            step_norm: self.step_norm,
        }
    }
}

/// Epoch range, phase switch, and persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    #[serde(default)]
    pub start_epoch: usize,

    /// First epoch of the second phase (generation, over-sampling, re-weighting)
    #[serde(default = "default_warm")]
    pub warm: usize,

    /// Class-balanced over-sampling from the warm epoch
    #[serde(default)]
    pub over: bool,

    #[serde(default)]
    pub seed: u64,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_run_name")]
    pub run_name: String,

    /// Checkpoint to resume the live network and optimizer from
    #[serde(default)]
    pub resume: Option<PathBuf>,

    /// Checkpoint of the pre-trained seed network
    #[serde(default)]
    pub seed_checkpoint: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            start_epoch: 0,
            warm: default_warm(),
            over: false,
            seed: 0,
            output_dir: default_output_dir(),
            run_name: default_run_name(),
            resume: None,
            seed_checkpoint: None,
        }
    }
}

impl TrainingConfig {
    /// Directory holding this run's checkpoints, CSV log, and tables
    pub fn run_dir(&self) -> PathBuf {
        self.output_dir.join(&self.run_name)
    }
}

fn default_true() -> bool {
    true
}

fn default_num_classes() -> usize {
    10
}

fn default_batch_size() -> usize {
    128
}

fn default_mean() -> Vec<f32> {
    vec![0.4914, 0.4822, 0.4465]
}

fn default_std() -> Vec<f32> {
    vec![0.2023, 0.1994, 0.2010]
}

fn default_val_fraction() -> f64 {
    0.5
}

fn default_test_per_class() -> usize {
    100
}

fn default_synthetic_noise() -> f32 {
    0.1
}

fn default_ratio() -> f64 {
    100.0
}

fn default_max_per_class() -> usize {
    5000
}

fn default_hidden() -> usize {
    128
}

fn default_lr() -> f32 {
    0.1
}

fn default_momentum() -> f32 {
    0.9
}

fn default_weight_decay() -> f32 {
    2e-4
}

fn default_warmup_epochs() -> usize {
    5
}

fn default_milestones() -> Vec<usize> {
    vec![160, 180]
}

fn default_lr_decay() -> f32 {
    0.01
}

fn default_loss_type() -> String {
    "ce".to_string()
}

fn default_focal_gamma() -> f32 {
    1.0
}

fn default_ldam_max_margin() -> f32 {
    0.5
}

fn default_ldam_scale() -> f32 {
    30.0
}

fn default_effective_beta() -> f64 {
    0.999
}

fn default_beta() -> f64 {
    0.999
}

fn default_gamma() -> f64 {
    0.99
}

fn default_lambda() -> f32 {
    0.5
}

fn default_step_size() -> f32 {
    0.1
}

fn default_attack_iter() -> usize {
    10
}

fn default_random_start_radius() -> f32 {
    0.5
}

fn default_gen_prob() -> f64 {
    0.5
}

fn default_epochs() -> usize {
    200
}

fn default_warm() -> usize {
    160
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("runs")
}

fn default_run_name() -> String {
    "equilibrar".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: ExperimentConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ExperimentConfig::default());
        assert_eq!(config.generation.beta, 0.999);
        assert_eq!(config.generation.attack_iter, 10);
        assert_eq!(config.training.warm, 160);
        assert_eq!(config.optim.milestones, vec![160, 180]);
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r"
imbalance:
  type: long_tail
  ratio: 50
loss:
  type: ldam
  cost_sensitive: true
generation:
  step_norm: linf
training:
  over: true
";
        let config: ExperimentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.imbalance.kind, ImbalanceType::LongTail);
        assert_eq!(config.imbalance.ratio, 50.0);
        assert_eq!(config.imbalance.max_per_class, 5000);
        assert_eq!(config.loss.kind, "ldam");
        assert!(config.loss.cost_sensitive);
        assert_eq!(config.generation.step_norm, StepNorm::Linf);
        assert!(config.training.over);
        assert_eq!(config.data.batch_size, 128);
    }

    #[test]
    fn test_generation_config_mapping() {
        let settings = GenerationSettings {
            attack_iter: 3,
            gamma: 0.5,
            ..GenerationSettings::default()
        };
        let generation = settings.generation_config();
        assert_eq!(generation.iterations, 3);
        assert_eq!(generation.gamma, 0.5);
        assert_eq!(generation.step_size, 0.1);
    }

    #[test]
    fn test_run_dir() {
        let training = TrainingConfig {
            output_dir: PathBuf::from("out"),
            run_name: "cifar".to_string(),
            ..TrainingConfig::default()
        };
        assert_eq!(training.run_dir(), PathBuf::from("out/cifar"));
    }
}
