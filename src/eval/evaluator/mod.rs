//! Held-out evaluation of a classifier on imbalanced data

mod model_evaluator;
mod result;

pub use model_evaluator::Evaluator;
pub use result::EvalReport;
