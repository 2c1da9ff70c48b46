//! Evaluation metrics and held-out evaluation

pub mod classification;
pub mod evaluator;

pub use classification::{ConfusionMatrix, MultiClassMetrics};
pub use evaluator::{EvalReport, Evaluator};
