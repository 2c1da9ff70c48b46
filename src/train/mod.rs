//! Training: losses, plain and generation epochs, statistics, and the
//! multi-epoch runner
//!
//! # Example
//!
//! ```
//! use equilibrar::data::{ClassStatistics, DataLoader, Dataset, ImageShape, Normalizer};
//! use equilibrar::model::{Mlp, MlpConfig};
//! use equilibrar::optim::Sgd;
//! use equilibrar::train::loss::CrossEntropyLoss;
//! use equilibrar::train::train_plain_epoch;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let stats = ClassStatistics::new(vec![20, 5]).unwrap();
//! let shape = ImageShape::new(1, 2, 2);
//! let data = Dataset::synthetic(&stats, shape, 0.05, &mut rng).unwrap();
//! let normalizer = Normalizer::identity(shape);
//!
//! let mut net = Mlp::new(&MlpConfig::new(4, 8, 2), &mut rng);
//! let mut sgd = Sgd::new(0.1, 0.9, 0.0);
//! let loader = DataLoader::new(&data, 8);
//! let result = train_plain_epoch(
//!     &mut net,
//!     &mut sgd,
//!     &CrossEntropyLoss::new(),
//!     &normalizer,
//!     loader.epoch(&mut rng),
//! );
//! assert_eq!(result.num_batches, 4);
//! ```

mod epoch;
pub mod loss;
mod runner;
mod stats;

pub use epoch::{train_plain_epoch, EpochOrchestrator, EpochResult};
pub use runner::{RunSummary, Runner};
pub use stats::{guarded_rate, EpochSuccess, RunningStats, SuccessTracker};
