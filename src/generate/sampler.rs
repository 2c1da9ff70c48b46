//! Choosing which batch rows to regenerate, from which seeds, and with what
//! acceptance probability

use super::AcceptanceRule;
use crate::data::ClassStatistics;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use tracing::trace;

/// How generation targets are chosen for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetingMode {
    /// Rows of frequent classes are resampled into generation requests that
    /// keep their own label as target; seeds come from more frequent classes
    Imbalanced,
    /// Every row gets a uniformly random target and is its own seed
    Balanced,
}

/// Generation work for one batch
///
/// All vectors have the same length; entry `k` describes one generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationPlan {
    /// Batch row overwritten if generation `k` is accepted
    pub indices: Vec<usize>,
    /// Batch row whose image seeds generation `k`
    pub seed_indices: Vec<usize>,
    pub seed_labels: Vec<usize>,
    pub target_labels: Vec<usize>,
    /// Bernoulli parameter of the acceptance gate
    pub accept_probs: Vec<f64>,
    /// Rows that wanted a generation but had no valid seed
    pub dropped: usize,
}

impl GenerationPlan {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Turns a batch's labels into a [`GenerationPlan`]
#[derive(Debug, Clone)]
pub struct AcceptanceSampler {
    stats: ClassStatistics,
    beta: f64,
    gen_prob: f64,
    mode: TargetingMode,
}

impl AcceptanceSampler {
    /// # Arguments
    /// * `stats` - Training-set class counts
    /// * `beta` - Decay of the acceptance weight `1 - beta^delta`
    /// * `gen_prob` - Fixed acceptance probability in balanced mode
    /// * `mode` - Targeting policy
    pub fn new(stats: ClassStatistics, beta: f64, gen_prob: f64, mode: TargetingMode) -> Self {
        Self {
            stats,
            beta,
            gen_prob,
            mode,
        }
    }

    pub fn mode(&self) -> TargetingMode {
        self.mode
    }

    pub fn stats(&self) -> &ClassStatistics {
        &self.stats
    }

    /// Acceptance rule matching this sampler's targeting
    ///
    /// Confidence filtering is skipped only for balanced targeting over a
    /// dataset whose class counts are all equal.
    pub fn acceptance_rule(&self) -> AcceptanceRule {
        if self.mode == TargetingMode::Balanced && self.stats.is_balanced() {
            AcceptanceRule::BernoulliOnly
        } else {
            AcceptanceRule::ConfidenceAndBernoulli
        }
    }

    /// Full plan for a batch with the given labels
    pub fn plan<R: Rng>(&self, labels: &[usize], rng: &mut R) -> GenerationPlan {
        match self.mode {
            TargetingMode::Balanced => self.plan_balanced(labels, rng),
            TargetingMode::Imbalanced => {
                let (indices, targets) = self.select_candidates(labels, rng);
                self.assign_seeds(labels, &indices, &targets, rng)
            }
        }
    }

    /// Rows that fail their class's keep draw, with their own labels as targets
    ///
    /// A row of class `c` is kept with probability `count[c] / max_count`, so
    /// rows of the most frequent class are never selected.
    pub fn select_candidates<R: Rng>(
        &self,
        labels: &[usize],
        rng: &mut R,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut indices = Vec::new();
        let mut targets = Vec::new();
        for (row, &label) in labels.iter().enumerate() {
            let keep = self.stats.keep_probability(label).clamp(0.0, 1.0);
            if !rng.random_bool(keep) {
                indices.push(row);
                targets.push(label);
            }
        }
        (indices, targets)
    }

    /// Acceptance weight of every batch row as a seed for `target`
    pub fn seed_weights(&self, labels: &[usize], target: usize) -> Vec<f64> {
        labels
            .iter()
            .map(|&seed| self.stats.acceptance_weight(seed, target, self.beta))
            .collect()
    }

    /// Draw a seed row for every candidate, proportionally to its weight
    ///
    /// Candidates whose weights are all zero are dropped. The chosen weight
    /// becomes the candidate's acceptance probability.
    pub fn assign_seeds<R: Rng>(
        &self,
        labels: &[usize],
        indices: &[usize],
        targets: &[usize],
        rng: &mut R,
    ) -> GenerationPlan {
        let mut plan = GenerationPlan::default();

        for (&row, &target) in indices.iter().zip(targets) {
            let weights = self.seed_weights(labels, target);
            let Ok(dist) = WeightedIndex::new(&weights) else {
                plan.dropped += 1;
                continue;
            };
            let seed = dist.sample(rng);

            plan.indices.push(row);
            plan.seed_indices.push(seed);
            plan.seed_labels.push(labels[seed]);
            plan.target_labels.push(target);
            plan.accept_probs.push(weights[seed]);
        }

        trace!(
            candidates = indices.len(),
            planned = plan.len(),
            dropped = plan.dropped,
            "assigned generation seeds"
        );
        plan
    }

    fn plan_balanced<R: Rng>(&self, labels: &[usize], rng: &mut R) -> GenerationPlan {
        let num_classes = self.stats.num_classes();
        let n = labels.len();
        GenerationPlan {
            indices: (0..n).collect(),
            seed_indices: (0..n).collect(),
            seed_labels: labels.to_vec(),
            target_labels: (0..n).map(|_| rng.random_range(0..num_classes)).collect(),
            accept_probs: vec![self.gen_prob.clamp(0.0, 1.0); n],
            dropped: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sampler(counts: Vec<usize>, beta: f64) -> AcceptanceSampler {
        AcceptanceSampler::new(
            ClassStatistics::new(counts).unwrap(),
            beta,
            0.5,
            TargetingMode::Imbalanced,
        )
    }

    #[test]
    fn test_majority_rows_never_selected() {
        let s = sampler(vec![100, 10], 0.9);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let (indices, targets) = s.select_candidates(&[0, 0, 0, 1], &mut rng);
            assert!(indices.iter().all(|&i| i == 3));
            assert!(targets.iter().all(|&t| t == 1));
        }
    }

    #[test]
    fn test_seed_weights_two_class_scenario() {
        let s = sampler(vec![100, 10], 0.9);
        let weights = s.seed_weights(&[0, 0, 1, 1], 1);
        assert_relative_eq!(weights[0], 1.0 - 0.9f64.powi(90), epsilon = 1e-12);
        assert!(weights[0] > 0.9999);
        assert_eq!(weights[2], 0.0);
        assert_eq!(weights[3], 0.0);

        // a majority target has no valid seed at all
        assert!(s.seed_weights(&[0, 0, 1, 1], 0).iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_minority_never_seeds_majority() {
        let s = sampler(vec![100, 10], 0.9);
        let mut rng = StdRng::seed_from_u64(5);
        let labels = [0, 0, 1, 1];
        for _ in 0..200 {
            let plan = s.assign_seeds(&labels, &[2, 3], &[1, 1], &mut rng);
            assert_eq!(plan.len(), 2);
            assert!(plan.seed_labels.iter().all(|&l| l == 0));
            assert!(plan.seed_indices.iter().all(|&i| i < 2));
        }
    }

    #[test]
    fn test_rows_without_valid_seed_are_dropped() {
        let s = sampler(vec![100, 10], 0.9);
        let mut rng = StdRng::seed_from_u64(1);
        // only minority rows in the batch: nobody can seed a minority target
        let plan = s.assign_seeds(&[1, 1, 1], &[0, 1], &[1, 1], &mut rng);
        assert!(plan.is_empty());
        assert_eq!(plan.dropped, 2);
    }

    #[test]
    fn test_accept_prob_is_chosen_weight() {
        let s = sampler(vec![50, 20, 5], 0.99);
        let mut rng = StdRng::seed_from_u64(9);
        let labels = [0, 1, 2, 2];
        let plan = s.assign_seeds(&labels, &[2, 3], &[2, 2], &mut rng);
        for k in 0..plan.len() {
            let expected =
                s.stats().acceptance_weight(plan.seed_labels[k], plan.target_labels[k], 0.99);
            assert_relative_eq!(plan.accept_probs[k], expected);
            assert!((0.0..=1.0).contains(&plan.accept_probs[k]));
        }
    }

    #[test]
    fn test_empty_batch_plans_nothing() {
        let s = sampler(vec![10, 1], 0.9);
        let mut rng = StdRng::seed_from_u64(0);
        let plan = s.plan(&[], &mut rng);
        assert!(plan.is_empty());
        assert_eq!(plan.dropped, 0);
    }

    #[test]
    fn test_balanced_plan_covers_every_row() {
        let s = AcceptanceSampler::new(
            ClassStatistics::new(vec![20, 20, 20]).unwrap(),
            0.999,
            0.3,
            TargetingMode::Balanced,
        );
        let mut rng = StdRng::seed_from_u64(2);
        let labels = [0, 1, 2, 1];
        let plan = s.plan(&labels, &mut rng);
        assert_eq!(plan.indices, vec![0, 1, 2, 3]);
        assert_eq!(plan.seed_indices, plan.indices);
        assert_eq!(plan.seed_labels, labels.to_vec());
        assert!(plan.target_labels.iter().all(|&t| t < 3));
        assert!(plan.accept_probs.iter().all(|&p| p == 0.3));
        assert_eq!(s.acceptance_rule(), AcceptanceRule::BernoulliOnly);
    }

    #[test]
    fn test_acceptance_rule_needs_balanced_counts() {
        let imbalanced = AcceptanceSampler::new(
            ClassStatistics::new(vec![20, 5]).unwrap(),
            0.9,
            0.5,
            TargetingMode::Balanced,
        );
        assert_eq!(imbalanced.acceptance_rule(), AcceptanceRule::ConfidenceAndBernoulli);
        assert_eq!(
            sampler(vec![10, 10], 0.9).acceptance_rule(),
            AcceptanceRule::ConfidenceAndBernoulli
        );
    }
}
