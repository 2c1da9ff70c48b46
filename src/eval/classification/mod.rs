//! Classification metrics for imbalanced evaluation
//!
//! - Confusion matrix accumulation
//! - Per-class precision, recall, F1
//! - Balanced accuracy and G-mean of per-class recall

mod confusion;
mod metrics;

pub use confusion::ConfusionMatrix;
pub use metrics::MultiClassMetrics;
