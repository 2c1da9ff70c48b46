//! Two-layer perceptron with optional batch normalisation

use super::{Backprop, Classifier, ModelOutput, ModelState, Mode, Parameter};
use crate::{Error, Result};
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Layer sizes and normalisation settings for [`Mlp`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpConfig {
    pub input_len: usize,
    pub hidden: usize,
    pub num_classes: usize,
    #[serde(default = "default_batch_norm")]
    pub batch_norm: bool,
    #[serde(default = "default_bn_momentum")]
    pub bn_momentum: f32,
    #[serde(default = "default_bn_eps")]
    pub bn_eps: f32,
}

fn default_batch_norm() -> bool {
    true
}

fn default_bn_momentum() -> f32 {
    0.1
}

fn default_bn_eps() -> f32 {
    1e-5
}

impl MlpConfig {
    pub fn new(input_len: usize, hidden: usize, num_classes: usize) -> Self {
        Self {
            input_len,
            hidden,
            num_classes,
            batch_norm: default_batch_norm(),
            bn_momentum: default_bn_momentum(),
            bn_eps: default_bn_eps(),
        }
    }

    pub fn with_batch_norm(mut self, enabled: bool) -> Self {
        self.batch_norm = enabled;
        self
    }
}

struct ForwardCache {
    inputs: Array2<f32>,
    normalized: Array2<f32>,
    inv_std: Array1<f32>,
    batch_stats: bool,
    pre_act: Array2<f32>,
    hidden: Array2<f32>,
}

/// `linear -> batch norm -> relu -> linear`
///
/// Batch norm uses batch statistics and updates its running estimates in
/// [`Mode::Train`]; [`Mode::Eval`] reads the running estimates only.
pub struct Mlp {
    config: MlpConfig,
    w1: Parameter,
    b1: Parameter,
    gamma: Parameter,
    beta: Parameter,
    w2: Parameter,
    b2: Parameter,
    running_mean: Array1<f32>,
    running_var: Array1<f32>,
    mode: Mode,
    cache: Option<ForwardCache>,
}

impl Mlp {
    /// Create with uniform `±1/sqrt(fan_in)` weights
    pub fn new<R: Rng>(config: &MlpConfig, rng: &mut R) -> Self {
        let (d, h, c) = (config.input_len, config.hidden, config.num_classes);
        let bound1 = 1.0 / (d.max(1) as f32).sqrt();
        let bound2 = 1.0 / (h.max(1) as f32).sqrt();
        let w1 = Array2::from_shape_fn((d, h), |_| rng.random_range(-bound1..=bound1));
        let w2 = Array2::from_shape_fn((h, c), |_| rng.random_range(-bound2..=bound2));

        Self {
            config: config.clone(),
            w1: Parameter::new(w1),
            b1: Parameter::new(Array2::zeros((1, h))),
            gamma: Parameter::new(Array2::ones((1, h))),
            beta: Parameter::new(Array2::zeros((1, h))),
            w2: Parameter::new(w2),
            b2: Parameter::new(Array2::zeros((1, c))),
            running_mean: Array1::zeros(h),
            running_var: Array1::ones(h),
            mode: Mode::Train,
            cache: None,
        }
    }

    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    pub fn running_mean(&self) -> &Array1<f32> {
        &self.running_mean
    }

    pub fn running_var(&self) -> &Array1<f32> {
        &self.running_var
    }

    fn batch_normalize(&mut self, z: &Array2<f32>) -> (Array2<f32>, Array1<f32>, bool) {
        let n = z.nrows();
        let h = self.config.hidden;
        let eps = self.config.bn_eps;

        if self.mode.is_training() && n > 0 {
            let mean = z.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(h));
            let centered = z - &mean;
            let var = centered
                .mapv(|v| v * v)
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::ones(h));
            let inv_std = var.mapv(|v| 1.0 / (v + eps).sqrt());

            let m = self.config.bn_momentum;
            let unbiased = if n > 1 {
                &var * (n as f32 / (n - 1) as f32)
            } else {
                var
            };
            self.running_mean = &self.running_mean * (1.0 - m) + &mean * m;
            self.running_var = &self.running_var * (1.0 - m) + &unbiased * m;

            (centered * &inv_std, inv_std, true)
        } else {
            let inv_std = self.running_var.mapv(|v| 1.0 / (v + eps).sqrt());
            ((z - &self.running_mean) * &inv_std, inv_std, false)
        }
    }
}

impl Classifier for Mlp {
    fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    fn input_len(&self) -> usize {
        self.config.input_len
    }

    fn forward(&mut self, inputs: &Array2<f32>) -> ModelOutput {
        let z1 = inputs.dot(&self.w1.value) + &self.b1.value;

        let (normalized, inv_std, batch_stats, pre_act) = if self.config.batch_norm {
            let (normalized, inv_std, batch_stats) = self.batch_normalize(&z1);
            let pre_act = &normalized * &self.gamma.value + &self.beta.value;
            (normalized, inv_std, batch_stats, pre_act)
        } else {
            let ones = Array1::ones(self.config.hidden);
            (z1.clone(), ones, false, z1)
        };

        let hidden = pre_act.mapv(|v| v.max(0.0));
        let logits = hidden.dot(&self.w2.value) + &self.b2.value;

        self.cache = Some(ForwardCache {
            inputs: inputs.clone(),
            normalized,
            inv_std,
            batch_stats,
            pre_act,
            hidden: hidden.clone(),
        });

        ModelOutput {
            logits,
            features: hidden,
        }
    }

    fn backward(&mut self, grad_logits: &Array2<f32>, backprop: Backprop) -> Array2<f32> {
        let Some(cache) = self.cache.as_ref() else {
            return Array2::zeros((grad_logits.nrows(), self.config.input_len));
        };
        let full = backprop == Backprop::Full;
        let n = grad_logits.nrows() as f32;

        let d_hidden = grad_logits.dot(&self.w2.value.t());
        let d_pre = d_hidden * &cache.pre_act.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });

        let d_z1 = if self.config.batch_norm {
            if full {
                self.gamma.grad += &(&d_pre * &cache.normalized)
                    .sum_axis(Axis(0))
                    .insert_axis(Axis(0));
                self.beta.grad += &d_pre.sum_axis(Axis(0)).insert_axis(Axis(0));
            }
            let d_norm = &d_pre * &self.gamma.value;
            if cache.batch_stats && n > 0.0 {
                let sum_d = d_norm.sum_axis(Axis(0));
                let sum_d_norm = (&d_norm * &cache.normalized).sum_axis(Axis(0));
                ((&d_norm * n - &sum_d - &cache.normalized * &sum_d_norm) * &cache.inv_std) / n
            } else {
                d_norm * &cache.inv_std
            }
        } else {
            d_pre
        };

        if full {
            self.w2.grad += &cache.hidden.t().dot(grad_logits);
            self.b2.grad += &grad_logits.sum_axis(Axis(0)).insert_axis(Axis(0));
            self.w1.grad += &cache.inputs.t().dot(&d_z1);
            self.b1.grad += &d_z1.sum_axis(Axis(0)).insert_axis(Axis(0));
        }

        d_z1.dot(&self.w1.value.t())
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        if self.config.batch_norm {
            vec![
                &mut self.w1,
                &mut self.b1,
                &mut self.gamma,
                &mut self.beta,
                &mut self.w2,
                &mut self.b2,
            ]
        } else {
            vec![&mut self.w1, &mut self.b1, &mut self.w2, &mut self.b2]
        }
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn state(&self) -> ModelState {
        ModelState {
            params: [&self.w1, &self.b1, &self.gamma, &self.beta, &self.w2, &self.b2]
                .iter()
                .map(|p| p.value.clone())
                .collect(),
            buffers: vec![self.running_mean.clone(), self.running_var.clone()],
        }
    }

    fn load_state(&mut self, state: ModelState) -> Result<()> {
        if state.params.len() != 6 || state.buffers.len() != 2 {
            return Err(Error::Checkpoint(format!(
                "expected 6 parameters and 2 buffers, got {} and {}",
                state.params.len(),
                state.buffers.len()
            )));
        }
        let targets = [
            &mut self.w1,
            &mut self.b1,
            &mut self.gamma,
            &mut self.beta,
            &mut self.w2,
            &mut self.b2,
        ];
        for (param, value) in targets.iter().zip(&state.params) {
            if param.value.dim() != value.dim() {
                return Err(Error::Checkpoint(format!(
                    "parameter shape mismatch: expected {:?}, got {:?}",
                    param.value.dim(),
                    value.dim()
                )));
            }
        }
        for (param, value) in targets.into_iter().zip(state.params) {
            *param = Parameter::new(value);
        }

        let mut buffers = state.buffers.into_iter();
        if let (Some(mean), Some(var)) = (buffers.next(), buffers.next()) {
            if mean.len() != self.config.hidden || var.len() != self.config.hidden {
                return Err(Error::Checkpoint("running statistics length mismatch".to_string()));
            }
            self.running_mean = mean;
            self.running_var = var;
        }
        self.cache = None;
        Ok(())
    }
}
