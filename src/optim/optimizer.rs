//! Optimizer trait

use crate::model::Parameter;

/// Trait for optimization algorithms
///
/// Parameters are borrowed from a model through
/// [`Classifier::parameters_mut`](crate::model::Classifier::parameters_mut),
/// always in the same order, so per-parameter state can be kept by index.
pub trait Optimizer {
    /// Perform a single optimization step
    fn step(&mut self, params: &mut [&mut Parameter]);

    /// Zero out all gradients
    fn zero_grad(&mut self, params: &mut [&mut Parameter]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}
