//! Learning rate schedulers

use super::Optimizer;

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Step the scheduler (called once per epoch)
    fn step(&mut self);
}

/// Linear warm-up followed by multiplicative decay at fixed milestones
///
/// With 1-based epoch `e`:
/// - `e <= warmup_epochs`: `lr = base * e / warmup_epochs`
/// - otherwise: `lr = base * factor^k`, `k` = number of milestones `m` with `e > m`
#[derive(Debug, Clone)]
pub struct WarmupMultiStepLR {
    base_lr: f32,
    warmup_epochs: usize,
    milestones: Vec<usize>,
    factor: f32,
    current_epoch: usize,
}

impl WarmupMultiStepLR {
    /// Create a new scheduler starting at epoch 0
    ///
    /// # Arguments
    /// * `base_lr` - Learning rate after warm-up
    /// * `warmup_epochs` - Number of linear warm-up epochs
    /// * `milestones` - Epochs after which the rate is multiplied by `factor`
    /// * `factor` - Multiplicative decay (e.g. 0.01)
    pub fn new(base_lr: f32, warmup_epochs: usize, milestones: Vec<usize>, factor: f32) -> Self {
        Self {
            base_lr,
            warmup_epochs,
            milestones,
            factor,
            current_epoch: 0,
        }
    }

    /// Jump to a 0-based epoch, e.g. after resuming
    pub fn set_epoch(&mut self, epoch: usize) {
        self.current_epoch = epoch;
    }

    pub fn epoch(&self) -> usize {
        self.current_epoch
    }

    /// Apply the current learning rate to an optimizer
    pub fn apply<O: Optimizer + ?Sized>(&self, optimizer: &mut O) {
        optimizer.set_lr(self.get_lr());
    }
}

impl LRScheduler for WarmupMultiStepLR {
    fn get_lr(&self) -> f32 {
        let epoch = self.current_epoch + 1;
        if epoch <= self.warmup_epochs {
            return self.base_lr * epoch as f32 / self.warmup_epochs as f32;
        }
        let decays = self.milestones.iter().filter(|&&m| epoch > m).count();
        self.base_lr * self.factor.powi(decays as i32)
    }

    fn step(&mut self) {
        self.current_epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::Sgd;
    use approx::assert_abs_diff_eq;

    fn schedule() -> WarmupMultiStepLR {
        WarmupMultiStepLR::new(0.1, 5, vec![160, 180], 0.01)
    }

    #[test]
    fn test_warmup_is_linear() {
        let mut s = schedule();
        assert_abs_diff_eq!(s.get_lr(), 0.02, epsilon = 1e-7);
        s.step();
        assert_abs_diff_eq!(s.get_lr(), 0.04, epsilon = 1e-7);
        s.set_epoch(4);
        assert_abs_diff_eq!(s.get_lr(), 0.1, epsilon = 1e-7);
    }

    #[test]
    fn test_milestones_compound() {
        let mut s = schedule();
        s.set_epoch(159);
        assert_abs_diff_eq!(s.get_lr(), 0.1, epsilon = 1e-7);
        s.step();
        assert_abs_diff_eq!(s.get_lr(), 0.001, epsilon = 1e-8);
        s.set_epoch(180);
        assert_abs_diff_eq!(s.get_lr(), 0.00001, epsilon = 1e-10);
    }

    #[test]
    fn test_no_warmup() {
        let s = WarmupMultiStepLR::new(0.5, 0, vec![], 0.1);
        assert_abs_diff_eq!(s.get_lr(), 0.5, epsilon = 1e-7);
    }

    #[test]
    fn test_apply_sets_optimizer_lr() {
        let mut opt = Sgd::new(1.0, 0.9, 0.0);
        let mut s = schedule();
        s.set_epoch(10);
        s.apply(&mut opt);
        assert_abs_diff_eq!(opt.lr(), 0.1, epsilon = 1e-7);
    }
}
