//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::model::Parameter;
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// SGD with heavy-ball momentum and L2 weight decay
///
/// ```text
/// d = grad + weight_decay * p
/// v = momentum * v + d        (v = d on the first step)
/// p = p - lr * v
/// ```
pub struct Sgd {
    lr: f32,
    momentum: f32,
    weight_decay: f32,
    velocities: Vec<Option<Array2<f32>>>,
}

/// Serializable momentum buffers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SgdState {
    pub lr: f32,
    pub velocities: Vec<Option<Array2<f32>>>,
}

impl Sgd {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32, weight_decay: f32) -> Self {
        Self {
            lr,
            momentum,
            weight_decay,
            velocities: Vec::new(),
        }
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }

    pub fn state(&self) -> SgdState {
        SgdState {
            lr: self.lr,
            velocities: self.velocities.clone(),
        }
    }

    pub fn load_state(&mut self, state: SgdState) -> Result<()> {
        if !state.lr.is_finite() {
            return Err(Error::Checkpoint(format!(
                "invalid optimizer learning rate {}",
                state.lr
            )));
        }
        self.lr = state.lr;
        self.velocities = state.velocities;
        Ok(())
    }

    /// Initialize velocities if needed
    fn ensure_velocities(&mut self, count: usize) {
        if self.velocities.len() != count {
            self.velocities = vec![None; count];
        }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        self.ensure_velocities(params.len());

        for (param, slot) in params.iter_mut().zip(self.velocities.iter_mut()) {
            let mut direction = param.grad.clone();
            if self.weight_decay != 0.0 {
                direction.scaled_add(self.weight_decay, &param.value);
            }

            if self.momentum > 0.0 {
                let velocity = match slot.take() {
                    Some(v) if v.dim() == direction.dim() => v * self.momentum + &direction,
                    _ => direction,
                };
                param.value.scaled_add(-self.lr, &velocity);
                *slot = Some(velocity);
            } else {
                param.value.scaled_add(-self.lr, &direction);
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}
