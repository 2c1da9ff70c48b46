//! Optimizers and learning rate schedules for the live classifier

mod optimizer;
mod scheduler;
mod sgd;

pub use optimizer::Optimizer;
pub use scheduler::{LRScheduler, WarmupMultiStepLR};
pub use sgd::{Sgd, SgdState};
