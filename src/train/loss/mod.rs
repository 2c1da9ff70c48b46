//! Per-sample classification losses
//!
//! Every criterion returns unreduced per-sample losses together with the
//! per-sample gradient w.r.t. the logits; reduction is left to the caller.
//!
//! - [`CrossEntropyLoss`] - optionally class-weighted cross-entropy
//! - [`FocalLoss`] - down-weights well-classified samples
//! - [`LdamLoss`] - label-distribution-aware margins
//!
//! [`LossKind`] is the configuration-level selector, resolved once into a
//! `Box<dyn Criterion>` by [`LossKind::build`].

mod cross_entropy;
mod focal;
mod kind;
mod ldam;
mod traits;

pub use cross_entropy::CrossEntropyLoss;
pub use focal::FocalLoss;
pub use kind::{LossKind, LossSettings};
pub use ldam::LdamLoss;
pub use traits::{Criterion, LossOutput};
