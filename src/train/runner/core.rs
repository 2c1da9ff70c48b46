//! Runner construction: data splits, networks, optimizer, and resume

use crate::config::{validate_class_counts, validate_config, ExperimentConfig, ValidationError};
use crate::data::{ClassStatistics, Dataset, ImbalanceType, Normalizer};
use crate::error::{Error, Result};
use crate::generate::{AcceptanceSampler, GenerationConfig, TargetingMode};
use crate::io::Checkpoint;
use crate::model::{Classifier, Mlp, MlpConfig};
use crate::optim::{Sgd, WarmupMultiStepLR};
use crate::train::loss::LossKind;
use crate::train::SuccessTracker;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the success table inside the run directory
pub(super) const SUCCESS_FILE: &str = "success.json";

/// File name of the best model's per-class test accuracy
pub(super) const CLASSWISE_FILE: &str = "classwise_acc.json";

/// Experiment driver
pub struct Runner {
    pub(super) config: ExperimentConfig,
    pub(super) train_set: Dataset,
    pub(super) val_set: Dataset,
    pub(super) test_set: Dataset,
    pub(super) train_stats: ClassStatistics,
    pub(super) normalizer: Normalizer,
    pub(super) live: Mlp,
    pub(super) seed_net: Mlp,
    /// The seed network was restored from trained weights
    pub(super) seed_trained: bool,
    pub(super) optimizer: Sgd,
    pub(super) scheduler: WarmupMultiStepLR,
    pub(super) loss_kind: LossKind,
    pub(super) sampler: AcceptanceSampler,
    pub(super) generation: GenerationConfig,
    pub(super) tracker: SuccessTracker,
    pub(super) rng: ChaCha12Rng,
    pub(super) start_epoch: usize,
    pub(super) best_val_bal_acc: f64,
    pub(super) run_dir: PathBuf,
}

impl Runner {
    /// Validate `config`, build the data splits and networks, and restore
    /// checkpoints named by the config
    pub fn from_config(config: ExperimentConfig) -> Result<Self> {
        validate_config(&config)?;
        let loss_kind: LossKind = config.loss.kind.parse()?;

        let mut rng = ChaCha12Rng::seed_from_u64(config.training.seed);
        let (train_set, held_out) = build_datasets(&config, &mut rng)?;
        let (test_set, val_set) = held_out.split(config.data.val_fraction, &mut rng);

        let train_stats = train_set.class_statistics()?;
        validate_class_counts(train_stats.counts(), config.data.num_classes)?;
        info!(
            counts = ?train_stats.counts(),
            ratio = train_stats.imbalance_ratio(),
            val = val_set.len(),
            test = test_set.len(),
            "training set ready"
        );

        let shape = train_set.shape();
        let normalizer = Normalizer::new(&config.data.mean, &config.data.std, shape)?;

        let model_config = MlpConfig::new(
            shape.feature_len(),
            config.model.hidden,
            train_stats.num_classes(),
        )
        .with_batch_norm(config.model.batch_norm);
        let live = Mlp::new(&model_config, &mut rng);
        let seed_net = Mlp::new(&model_config, &mut rng);

        let optim = &config.optim;
        let optimizer = Sgd::new(optim.lr, optim.momentum, optim.weight_decay);
        let scheduler = WarmupMultiStepLR::new(
            optim.lr,
            optim.warmup_epochs,
            optim.milestones.clone(),
            optim.lr_decay,
        );

        let mode = match config.imbalance.kind {
            ImbalanceType::None => TargetingMode::Balanced,
            ImbalanceType::LongTail | ImbalanceType::Step => TargetingMode::Imbalanced,
        };
        let sampler = AcceptanceSampler::new(
            train_stats.clone(),
            config.generation.beta,
            config.generation.gen_prob,
            mode,
        );

        let run_dir = config.training.run_dir();
        let mut runner = Self {
            generation: config.generation.generation_config(),
            tracker: SuccessTracker::new(train_stats.num_classes()),
            seed_trained: false,
            start_epoch: config.training.start_epoch,
            best_val_bal_acc: 0.0,
            config,
            train_set,
            val_set,
            test_set,
            train_stats,
            normalizer,
            live,
            seed_net,
            optimizer,
            scheduler,
            loss_kind,
            sampler,
            rng,
            run_dir,
        };
        runner.restore()?;
        Ok(runner)
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// First epoch the next [`run`](Self::run) executes
    pub fn start_epoch(&self) -> usize {
        self.start_epoch
    }

    pub fn train_stats(&self) -> &ClassStatistics {
        &self.train_stats
    }

    pub fn train_set(&self) -> &Dataset {
        &self.train_set
    }

    pub fn val_set(&self) -> &Dataset {
        &self.val_set
    }

    pub fn test_set(&self) -> &Dataset {
        &self.test_set
    }

    pub fn live(&self) -> &Mlp {
        &self.live
    }

    pub fn seed_net(&self) -> &Mlp {
        &self.seed_net
    }

    pub fn tracker(&self) -> &SuccessTracker {
        &self.tracker
    }

    /// Whether generation steers with a trained seed network
    pub fn seed_trained(&self) -> bool {
        self.seed_trained
    }

    /// Load the live network, optimizer, RNG, and seed network from checkpoints
    fn restore(&mut self) -> Result<()> {
        if let Some(path) = self.config.training.resume.clone() {
            info!(path = %path.display(), "resuming from checkpoint");
            let checkpoint = Checkpoint::load(&path)?;
            self.live.load_state(checkpoint.model)?;
            self.optimizer.load_state(checkpoint.optimizer)?;
            self.start_epoch = checkpoint.epoch + 1;
            self.rng = checkpoint.rng;
            if let Some(seed_state) = checkpoint.seed_model {
                self.seed_net.load_state(seed_state)?;
                self.seed_trained = true;
            }

            let success_path = self.run_dir.join(SUCCESS_FILE);
            if success_path.exists() {
                self.tracker = SuccessTracker::load(&success_path)?;
            }
        }

        if let Some(path) = self.config.training.seed_checkpoint.clone() {
            info!(path = %path.display(), "loading seed network");
            let checkpoint = Checkpoint::load(&path)?;
            self.seed_net.load_state(checkpoint.model)?;
            self.seed_trained = true;
        }

        if self.config.generation.enabled && !self.seed_trained {
            warn!("no seed network checkpoint given; generation uses an untrained seed network");
        }
        if self.config.training.over && self.config.training.warm < self.start_epoch {
            return Err(Error::Validation(ValidationError::WarmBeforeStart {
                warm: self.config.training.warm,
                start_epoch: self.start_epoch,
            }));
        }
        Ok(())
    }
}

/// Imbalanced training set plus the held-out pool for validation and test
fn build_datasets<R: Rng>(config: &ExperimentConfig, rng: &mut R) -> Result<(Dataset, Dataset)> {
    let data = &config.data;
    let imbalance = &config.imbalance;
    let schedule = ClassStatistics::from_profile(
        imbalance.kind,
        data.num_classes,
        imbalance.max_per_class,
        imbalance.ratio,
    )?;

    match (&data.train_path, &data.test_path) {
        (Some(train_path), Some(test_path)) => {
            let full = Dataset::from_json(train_path)?;
            validate_class_counts(schedule.counts(), full.num_classes())?;
            let train_set = full.take_per_class(&schedule)?;
            let held_out = Dataset::from_json(test_path)?;
            if held_out.shape() != train_set.shape() {
                return Err(Error::Shape {
                    expected: format!("{:?}", train_set.shape()),
                    actual: format!("{:?}", held_out.shape()),
                });
            }
            Ok((train_set, held_out))
        }
        (None, None) => {
            let pool_counts: Vec<usize> = schedule
                .counts()
                .iter()
                .map(|&n| n + data.test_per_class)
                .collect();
            let pool = Dataset::synthetic(
                &ClassStatistics::new(pool_counts)?,
                data.image_shape,
                data.synthetic_noise,
                rng,
            )?;
            pool.partition_per_class(&schedule)
        }
        _ => Err(Error::Config(
            "data.train_path and data.test_path must be given together".to_string(),
        )),
    }
}
