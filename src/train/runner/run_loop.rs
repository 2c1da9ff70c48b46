//! The epoch loop

use super::core::{Runner, CLASSWISE_FILE, SUCCESS_FILE};
use super::result::RunSummary;
use crate::data::DataLoader;
use crate::error::Result;
use crate::eval::{EvalReport, Evaluator};
use crate::io::{checkpoint_path, save_json, Checkpoint, CsvLogger, EpochLogRow};
use crate::model::Classifier;
use crate::optim::LRScheduler;
use crate::train::loss::Criterion;
use crate::train::{train_plain_epoch, EpochOrchestrator};
use tracing::{debug, info};

impl Runner {
    /// Train from the start epoch to `training.epochs`
    ///
    /// Every epoch appends one CSV row. Whenever the validation balanced
    /// accuracy reaches a new best (ties included), the test set is evaluated,
    /// the live network is checkpointed, and its per-class test accuracy is
    /// written to the run directory.
    pub fn run(&mut self) -> Result<RunSummary> {
        let training = self.config.training.clone();
        let csv = CsvLogger::open(self.run_dir.join(format!("log_{}.csv", training.seed)))?;
        let loss_settings = self.config.loss.settings();

        let mut best_epoch = None;
        let mut test_report: Option<EvalReport> = None;
        let mut last_epoch = None;
        let mut epochs_run = 0;

        for epoch in self.start_epoch..training.epochs {
            info!(" * Epoch {epoch}: {}", self.run_dir.display());
            self.scheduler.set_epoch(epoch);
            self.scheduler.apply(&mut self.optimizer);
            debug!(lr = self.scheduler.get_lr(), "learning rate");

            let second_phase = epoch >= training.warm;
            if epoch == training.warm && training.over {
                info!("=============== Applying over sampling ===============");
            }
            let loader = if second_phase && training.over {
                DataLoader::oversampled(&self.train_set, self.config.data.batch_size)?
            } else {
                DataLoader::new(&self.train_set, self.config.data.batch_size)
            };

            let weights = (self.config.loss.cost_sensitive && second_phase).then(|| {
                self.train_stats
                    .effective_number_weights(self.config.loss.effective_beta)
            });
            let criterion: Box<dyn Criterion> =
                self.loss_kind
                    .build(&loss_settings, &self.train_stats, weights);

            let generation_epoch = second_phase && self.config.generation.enabled;
            let result = if generation_epoch {
                let orchestrator =
                    EpochOrchestrator::new(&self.sampler, &self.generation, &self.normalizer);
                let result = orchestrator.run_epoch(
                    &mut self.live,
                    &mut self.seed_net,
                    &mut self.optimizer,
                    criterion.as_ref(),
                    loader.epoch(&mut self.rng),
                    &mut self.tracker,
                    &mut self.rng,
                );
                self.close_success_table(epoch)?;
                result
            } else {
                let result = train_plain_epoch(
                    &mut self.live,
                    &mut self.optimizer,
                    criterion.as_ref(),
                    &self.normalizer,
                    loader.epoch(&mut self.rng),
                );
                if epoch + 1 == training.warm {
                    self.save_checkpoint(epoch, result.train_acc, true)?;
                }
                result
            };

            let evaluator = Evaluator::new(
                &self.normalizer,
                &self.train_stats,
                self.config.data.batch_size,
            );
            let val = evaluator.evaluate(&mut self.live, &self.val_set, criterion.as_ref());
            info!("[Val] {val}");

            if val.balanced_accuracy >= self.best_val_bal_acc {
                self.best_val_bal_acc = val.balanced_accuracy;
                best_epoch = Some(epoch);

                let test = evaluator.evaluate(&mut self.live, &self.test_set, criterion.as_ref());
                info!("[Test] {test}");
                self.save_checkpoint(epoch, test.balanced_accuracy, false)?;
                info!(
                    "========== Class-wise test performance ( avg : {:.4} ) ==========",
                    test.mean_class_acc()
                );
                save_json(&test.class_acc, self.run_dir.join(CLASSWISE_FILE))?;
                test_report = Some(test);
            }

            csv.append(&EpochLogRow::new(epoch, &result, test_report.as_ref()))?;
            last_epoch = Some(result);
            epochs_run += 1;
        }

        self.start_epoch = self.start_epoch.max(training.epochs);
        info!(
            best_val_bal_acc = self.best_val_bal_acc,
            epochs = epochs_run,
            "run finished"
        );

        Ok(RunSummary {
            epochs_run,
            best_val_bal_acc: self.best_val_bal_acc,
            best_epoch,
            test: test_report,
            last_epoch,
            run_dir: self.run_dir.clone(),
        })
    }

    /// Close the running success table under `epoch` and persist the history
    fn close_success_table(&mut self, epoch: usize) -> Result<()> {
        let success = self.tracker.finish_epoch(epoch);
        let tail = success.table.len().saturating_sub(10);
        debug!(epoch, table = ?&success.table[tail..], "success table");
        self.tracker.save(self.run_dir.join(SUCCESS_FILE))
    }

    /// Checkpoint the live network, the RNG, and a trained seed network
    fn save_checkpoint(&self, epoch: usize, acc: f64, indexed: bool) -> Result<()> {
        info!("Saving..");
        let seed = self.config.training.seed;
        let checkpoint = Checkpoint {
            model: self.live.state(),
            optimizer: self.optimizer.state(),
            epoch,
            acc,
            rng: self.rng.clone(),
            seed_model: (self.config.generation.enabled && self.seed_trained)
                .then(|| self.seed_net.state()),
        };
        let path = checkpoint_path(&self.run_dir, seed, indexed.then_some(epoch));
        checkpoint.save(path)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ExperimentConfig;
    use crate::data::{ImageShape, ImbalanceType};
    use crate::io::{checkpoint_path, Checkpoint, CsvLogger};
    use crate::model::Classifier;
    use crate::train::{Runner, SuccessTracker};
    use rand::Rng;
    use std::path::Path;
    use tempfile::TempDir;

    fn small_config(dir: &Path) -> ExperimentConfig {
        let mut config = ExperimentConfig::default();
        config.data.num_classes = 3;
        config.data.batch_size = 16;
        config.data.image_shape = ImageShape::new(1, 3, 3);
        config.data.mean = vec![0.5];
        config.data.std = vec![0.25];
        config.data.test_per_class = 10;
        config.imbalance.kind = ImbalanceType::LongTail;
        config.imbalance.ratio = 10.0;
        config.imbalance.max_per_class = 40;
        config.model.hidden = 8;
        config.optim.warmup_epochs = 1;
        config.generation.attack_iter = 2;
        config.training.epochs = 3;
        config.training.warm = 1;
        config.training.output_dir = dir.to_path_buf();
        config.training.run_name = "loop".to_string();
        config
    }

    #[test]
    fn test_run_writes_artifacts() {
        let dir = TempDir::new().unwrap();
        let mut runner = Runner::from_config(small_config(dir.path())).unwrap();
        let summary = runner.run().unwrap();

        assert_eq!(summary.epochs_run, 3);
        assert!(summary.best_epoch.is_some());
        assert!(summary.test.is_some());
        assert!((0.0..=1.0).contains(&summary.best_val_bal_acc));

        let run_dir = dir.path().join("loop");
        let rows = CsvLogger::open(run_dir.join("log_0.csv"))
            .unwrap()
            .read_rows()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].epoch, 2);

        assert!(checkpoint_path(&run_dir, 0, None).exists());
        assert!(checkpoint_path(&run_dir, 0, Some(0)).exists());
        assert!(run_dir.join("classwise_acc.json").exists());

        let tracker = SuccessTracker::load(run_dir.join("success.json")).unwrap();
        let epochs: Vec<usize> = tracker.history().iter().map(|e| e.epoch).collect();
        assert_eq!(epochs, vec![1, 2]);
    }

    #[test]
    fn test_plain_run_has_no_success_table() {
        let dir = TempDir::new().unwrap();
        let mut config = small_config(dir.path());
        config.generation.enabled = false;
        config.training.epochs = 2;
        let mut runner = Runner::from_config(config).unwrap();
        let summary = runner.run().unwrap();

        assert_eq!(summary.epochs_run, 2);
        assert!(!dir.path().join("loop").join("success.json").exists());
        assert_eq!(summary.last_epoch.unwrap().num_gen, 0);
    }

    #[test]
    fn test_resume_continues_after_checkpoint_epoch() {
        let dir = TempDir::new().unwrap();
        let config = small_config(dir.path());
        let mut runner = Runner::from_config(config.clone()).unwrap();
        runner.run().unwrap();

        let run_dir = dir.path().join("loop");
        let saved = Checkpoint::load(checkpoint_path(&run_dir, 0, None)).unwrap();

        let mut resumed = config;
        resumed.training.epochs = saved.epoch + 3;
        resumed.training.resume = Some(checkpoint_path(&run_dir, 0, None));
        let mut runner = Runner::from_config(resumed).unwrap();
        assert_eq!(runner.start_epoch(), saved.epoch + 1);

        let summary = runner.run().unwrap();
        assert_eq!(summary.epochs_run, 2);
    }

    #[test]
    fn test_oversampling_after_warm() {
        let dir = TempDir::new().unwrap();
        let mut config = small_config(dir.path());
        config.training.over = true;
        config.loss.cost_sensitive = true;
        config.loss.kind = "ldam".to_string();
        let mut runner = Runner::from_config(config).unwrap();
        let summary = runner.run().unwrap();
        assert_eq!(summary.epochs_run, 3);
    }

    #[test]
    fn test_untrained_seed_network_not_checkpointed() {
        let dir = TempDir::new().unwrap();
        let config = small_config(dir.path());
        let mut runner = Runner::from_config(config.clone()).unwrap();
        assert!(!runner.seed_trained());
        runner.run().unwrap();

        let path = checkpoint_path(dir.path().join("loop"), 0, None);
        assert!(Checkpoint::load(&path).unwrap().seed_model.is_none());

        let mut resumed = config;
        resumed.training.resume = Some(path);
        let runner = Runner::from_config(resumed).unwrap();
        assert!(!runner.seed_trained());
    }

    #[test]
    fn test_trained_seed_network_survives_resume() {
        let dir = TempDir::new().unwrap();
        let mut baseline = small_config(dir.path());
        baseline.generation.enabled = false;
        baseline.training.run_name = "baseline".to_string();
        baseline.training.epochs = 1;
        Runner::from_config(baseline).unwrap().run().unwrap();
        let seed_path = checkpoint_path(dir.path().join("baseline"), 0, None);
        let seed_state = Checkpoint::load(&seed_path).unwrap().model;

        let mut config = small_config(dir.path());
        config.training.seed_checkpoint = Some(seed_path);
        let mut runner = Runner::from_config(config.clone()).unwrap();
        assert!(runner.seed_trained());
        runner.run().unwrap();

        let path = checkpoint_path(dir.path().join("loop"), 0, None);
        assert_eq!(Checkpoint::load(&path).unwrap().seed_model, Some(seed_state.clone()));

        let mut resumed = config;
        resumed.training.seed_checkpoint = None;
        resumed.training.resume = Some(path);
        let runner = Runner::from_config(resumed).unwrap();
        assert!(runner.seed_trained());
        assert_eq!(runner.seed_net().state(), seed_state);
    }

    #[test]
    fn test_resume_continues_random_stream() {
        let dir = TempDir::new().unwrap();
        let mut config = small_config(dir.path());
        config.training.epochs = 2;
        let mut runner = Runner::from_config(config.clone()).unwrap();
        runner.run().unwrap();
        runner.save_checkpoint(1, 0.0, false).unwrap();

        let mut uninterrupted = runner.rng.clone();
        let expected: Vec<u64> = (0..16).map(|_| uninterrupted.random()).collect();

        let mut resumed = config;
        resumed.training.epochs = 3;
        resumed.training.resume = Some(checkpoint_path(dir.path().join("loop"), 0, None));
        let mut runner = Runner::from_config(resumed).unwrap();
        assert_eq!(runner.start_epoch(), 2);
        let drawn: Vec<u64> = (0..16).map(|_| runner.rng.random()).collect();
        assert_eq!(drawn, expected);
    }

    #[test]
    fn test_resumed_epoch_matches_uninterrupted() {
        let full_dir = TempDir::new().unwrap();
        let mut full = small_config(full_dir.path());
        full.generation.enabled = false;
        let expected = Runner::from_config(full.clone())
            .unwrap()
            .run()
            .unwrap()
            .last_epoch
            .unwrap();

        let split_dir = TempDir::new().unwrap();
        let mut first = full.clone();
        first.training.output_dir = split_dir.path().to_path_buf();
        first.training.epochs = 2;
        let mut runner = Runner::from_config(first.clone()).unwrap();
        runner.run().unwrap();
        runner.save_checkpoint(1, 0.0, false).unwrap();

        let mut second = first;
        second.training.epochs = 3;
        second.training.resume = Some(checkpoint_path(split_dir.path().join("loop"), 0, None));
        let summary = Runner::from_config(second).unwrap().run().unwrap();
        assert_eq!(summary.epochs_run, 1);
        assert_eq!(summary.last_epoch.unwrap(), expected);
    }
}
