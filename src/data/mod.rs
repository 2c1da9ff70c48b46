//! Datasets, batches, loaders, and class-count statistics
//!
//! Images are stored flattened (`C*H*W`) in `[0, 1]`, one row per sample.

mod batch;
mod class_stats;
mod dataset;
mod loader;
mod normalize;

pub use batch::Batch;
pub use class_stats::{acceptance_weight, ClassGroup, ClassStatistics, ImbalanceType};
pub(crate) use dataset::standard_normal;
pub use dataset::{Dataset, ImageShape};
pub use loader::{Batches, DataLoader, Sampling};
pub use normalize::Normalizer;
