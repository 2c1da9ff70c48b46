//! Per-channel input normalisation

use super::dataset::ImageShape;
use crate::{Error, Result};
use ndarray::{Array1, Array2};

/// Maps `[0, 1]` images to `(x - mean_c) / std_c` per channel
///
/// Networks always see normalised inputs, while perturbation and clamping act
/// on raw pixels, so the generator needs [`Normalizer::backward`] to pull
/// gradients back to pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    mean: Array1<f32>,
    inv_std: Array1<f32>,
}

impl Normalizer {
    /// Create from per-channel statistics
    pub fn new(mean: &[f32], std: &[f32], shape: ImageShape) -> Result<Self> {
        if mean.len() != shape.channels || std.len() != shape.channels {
            return Err(Error::Shape {
                expected: format!("{} channel statistics", shape.channels),
                actual: format!("mean {}, std {}", mean.len(), std.len()),
            });
        }
        if let Some(&bad) = std.iter().find(|&&s| s <= 0.0) {
            return Err(Error::Config(format!(
                "normalisation std must be positive, got {bad}"
            )));
        }

        let plane = shape.plane_len();
        let mean = Array1::from_shape_fn(shape.feature_len(), |j| mean[j / plane]);
        let inv_std = Array1::from_shape_fn(shape.feature_len(), |j| 1.0 / std[j / plane]);
        Ok(Self { mean, inv_std })
    }

    /// Pass-through normaliser
    pub fn identity(shape: ImageShape) -> Self {
        Self {
            mean: Array1::zeros(shape.feature_len()),
            inv_std: Array1::ones(shape.feature_len()),
        }
    }

    pub fn feature_len(&self) -> usize {
        self.mean.len()
    }

    /// Normalise a batch of flattened images
    pub fn normalize(&self, images: &Array2<f32>) -> Array2<f32> {
        (images - &self.mean) * &self.inv_std
    }

    /// Gradient with respect to raw pixels given the gradient w.r.t. normalised inputs
    pub fn backward(&self, grad: &Array2<f32>) -> Array2<f32> {
        grad * &self.inv_std
    }
}
