//! Equilibrar: major-to-minor oversampling for imbalanced classification
//!
//! Minority-class samples are synthesised by translating majority-class seed
//! images toward a minority target with a frozen seed classifier, then mixed
//! into the live classifier's training batches.
//!
//! # Pipeline
//!
//! For every batch of a generation epoch:
//!
//! 1. [`generate::AcceptanceSampler`] picks which samples to replace, their
//!    target classes, seed images, and acceptance probabilities.
//! 2. [`generate::SampleGenerator`] runs an L2-bounded gradient search from the
//!    seeds toward the targets and decides which results are accepted.
//! 3. [`generate::BatchMixer`] writes accepted samples into the batch and takes
//!    one optimiser step on the live classifier.
//! 4. [`train::EpochOrchestrator`] folds the batch statistics into the epoch
//!    result.
//!
//! # Example
//!
//! ```no_run
//! use equilibrar::config::load_config;
//! use equilibrar::train::Runner;
//!
//! let config = load_config("experiment.yaml")?;
//! let mut runner = Runner::from_config(config)?;
//! let summary = runner.run()?;
//! println!("best balanced accuracy: {:.2}", summary.best_val_bal_acc);
//! # Ok::<(), equilibrar::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod generate;
pub mod io;
pub mod logging;
pub mod model;
pub mod optim;
pub mod train;

pub use error::{Error, Result};

/// Denominator floor for rates computed over possibly-empty subsets
pub const RATE_EPSILON: f64 = 1e-6;
