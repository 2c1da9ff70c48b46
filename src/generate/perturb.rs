//! Bounded perturbation steps on flattened image batches

use ndarray::{Array2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Gradient norms below this produce a zero step
pub const NORM_EPSILON: f32 = 1e-10;

/// Geometry of a perturbation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepNorm {
    /// `step_size * g / ||g||_2` per sample
    #[default]
    L2,
    /// `step_size * sign(g)`
    Linf,
}

/// Update to subtract from the images for one descent step
///
/// Under [`StepNorm::L2`] every row of the result has L2 norm `step_size`, or
/// is all zeros when the row's gradient norm is below [`NORM_EPSILON`].
pub fn make_step(grad: &Array2<f32>, norm: StepNorm, step_size: f32) -> Array2<f32> {
    let mut step = grad.clone();
    match norm {
        StepNorm::L2 => {
            for mut row in step.axis_iter_mut(Axis(0)) {
                let row_norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
                if row_norm < NORM_EPSILON {
                    row.fill(0.0);
                } else {
                    let scale = step_size / row_norm;
                    row.mapv_inplace(|v| v * scale);
                }
            }
        }
        StepNorm::Linf => {
            step.mapv_inplace(|v| {
                if v > 0.0 {
                    step_size
                } else if v < 0.0 {
                    -step_size
                } else {
                    0.0
                }
            });
        }
    }
    step
}

/// Random start offset for `rows x cols` images
///
/// Uniform noise in `[-0.5, 0.5)` whose per-row L2 norm is capped at `radius`
/// (L2), or uniform noise in `[-radius, radius)` (Linf).
pub fn random_perturb<R: Rng>(
    rows: usize,
    cols: usize,
    norm: StepNorm,
    radius: f32,
    rng: &mut R,
) -> Array2<f32> {
    match norm {
        StepNorm::L2 => {
            let mut noise = Array2::from_shape_fn((rows, cols), |_| rng.random::<f32>() - 0.5);
            for mut row in noise.axis_iter_mut(Axis(0)) {
                let row_norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
                if row_norm > radius {
                    let scale = radius / row_norm;
                    row.mapv_inplace(|v| v * scale);
                }
            }
            noise
        }
        StepNorm::Linf => {
            Array2::from_shape_fn((rows, cols), |_| (rng.random::<f32>() - 0.5) * 2.0 * radius)
        }
    }
}

/// Clamp every pixel into `[0, 1]`
pub fn clamp_unit(images: &mut Array2<f32>) {
    images.mapv_inplace(|v| v.clamp(0.0, 1.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn row_norms(a: &Array2<f32>) -> Vec<f32> {
        a.axis_iter(Axis(0))
            .map(|r| r.iter().map(|v| v * v).sum::<f32>().sqrt())
            .collect()
    }

    #[test]
    fn test_l2_step_has_step_size_norm() {
        let step = make_step(&array![[3.0, 4.0], [0.0, -2.0]], StepNorm::L2, 0.1);
        assert_relative_eq!(step[[0, 0]], 0.06, epsilon = 1e-6);
        assert_relative_eq!(step[[0, 1]], 0.08, epsilon = 1e-6);
        assert_relative_eq!(step[[1, 1]], -0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_gradient_gives_zero_step() {
        let step = make_step(&array![[0.0, 0.0], [1e-12, 0.0]], StepNorm::L2, 0.5);
        assert!(step.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_linf_step_is_signed() {
        let step = make_step(&array![[2.0, -0.1, 0.0]], StepNorm::Linf, 0.3);
        assert_eq!(step, array![[0.3f32, -0.3, 0.0]]);
    }

    #[test]
    fn test_random_perturb_l2_radius() {
        let mut rng = StdRng::seed_from_u64(11);
        let noise = random_perturb(16, 192, StepNorm::L2, 0.5, &mut rng);
        assert_eq!(noise.dim(), (16, 192));
        for n in row_norms(&noise) {
            assert!(n <= 0.5 + 1e-5);
        }
    }

    #[test]
    fn test_random_perturb_linf_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let noise = random_perturb(4, 10, StepNorm::Linf, 0.2, &mut rng);
        assert!(noise.iter().all(|v| v.abs() <= 0.2));
    }

    #[test]
    fn test_clamp_unit() {
        let mut x = array![[-0.5, 0.5, 1.5]];
        clamp_unit(&mut x);
        assert_eq!(x, array![[0.0f32, 0.5, 1.0]]);
    }

    proptest! {
        #[test]
        fn prop_l2_step_norm_bounded(
            values in prop::collection::vec(-100.0f32..100.0, 24),
            step_size in 0.001f32..2.0,
        ) {
            let grad = Array2::from_shape_vec((4, 6), values).unwrap();
            let step = make_step(&grad, StepNorm::L2, step_size);
            for n in row_norms(&step) {
                prop_assert!(n <= step_size * (1.0 + 1e-4));
            }
        }

        #[test]
        fn prop_nonzero_gradient_moves_full_step(
            values in prop::collection::vec(0.01f32..10.0, 8),
            step_size in 0.01f32..1.0,
        ) {
            let grad = Array2::from_shape_vec((2, 4), values).unwrap();
            let step = make_step(&grad, StepNorm::L2, step_size);
            for n in row_norms(&step) {
                prop_assert!((n - step_size).abs() <= step_size * 1e-4);
            }
        }

        #[test]
        fn prop_clamped_images_in_unit_range(
            pixels in prop::collection::vec(0.0f32..=1.0, 12),
            grads in prop::collection::vec(-5.0f32..5.0, 12),
            step_size in 0.0f32..3.0,
        ) {
            let mut x = Array2::from_shape_vec((3, 4), pixels).unwrap();
            let g = Array2::from_shape_vec((3, 4), grads).unwrap();
            x -= &make_step(&g, StepNorm::L2, step_size);
            clamp_unit(&mut x);
            prop_assert!(x.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }
}
