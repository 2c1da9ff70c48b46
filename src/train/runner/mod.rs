//! Multi-epoch experiment driver
//!
//! A [`Runner`] owns everything an experiment needs: the data splits, the
//! live and seed classifiers, the optimizer and its schedule, and the run
//! directory. Epochs before `training.warm` train plainly; from the warm
//! epoch on, generation epochs replace them when generation is enabled.
//!
//! # Example
//!
//! ```no_run
//! use equilibrar::config::ExperimentConfig;
//! use equilibrar::train::Runner;
//!
//! let mut config = ExperimentConfig::default();
//! config.data.num_classes = 3;
//! config.imbalance.max_per_class = 50;
//! config.training.epochs = 4;
//! config.training.warm = 2;
//!
//! let mut runner = Runner::from_config(config)?;
//! let summary = runner.run()?;
//! println!("{:.3}", summary.best_val_bal_acc);
//! # Ok::<(), equilibrar::Error>(())
//! ```

mod core;
mod result;
mod run_loop;

pub use core::Runner;
pub use result::RunSummary;
