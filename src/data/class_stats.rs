//! Per-class sample counts and the imbalance quantities derived from them

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Shape of the class-count schedule used to build an imbalanced dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImbalanceType {
    /// Every class keeps `max_per_class` samples
    #[default]
    None,
    /// Exponential decay from `max_per_class` down to `max_per_class / ratio`
    LongTail,
    /// First half of the classes keep `max_per_class`, the rest `max_per_class / ratio`
    Step,
}

/// Coarse frequency group of a class, used for grouped evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassGroup {
    Major,
    Neutral,
    Minor,
}

/// Ordered per-class sample counts
///
/// Index `c` holds the number of training samples of class `c`. The table is
/// fixed for a training phase; acceptance weights and keep probabilities are
/// derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStatistics {
    counts: Vec<usize>,
}

impl ClassStatistics {
    /// Create from explicit counts
    pub fn new(counts: Vec<usize>) -> Result<Self> {
        if counts.is_empty() {
            return Err(Error::Data("class statistics need at least one class".to_string()));
        }
        Ok(Self { counts })
    }

    /// Count labels, assuming classes `0..num_classes`
    pub fn from_labels(labels: &[usize], num_classes: usize) -> Result<Self> {
        let mut counts = vec![0usize; num_classes];
        for &label in labels {
            let slot = counts.get_mut(label).ok_or_else(|| {
                Error::Data(format!("label {label} out of range for {num_classes} classes"))
            })?;
            *slot += 1;
        }
        Self::new(counts)
    }

    /// Build the count schedule of an imbalance profile
    ///
    /// `ratio` is the head-to-tail ratio; `ratio <= 1` yields a balanced table.
    pub fn from_profile(
        imbalance: ImbalanceType,
        num_classes: usize,
        max_per_class: usize,
        ratio: f64,
    ) -> Result<Self> {
        if num_classes == 0 {
            return Err(Error::Data("imbalance profile needs at least one class".to_string()));
        }
        let ratio = ratio.max(1.0);
        let counts = match imbalance {
            ImbalanceType::None => vec![max_per_class; num_classes],
            ImbalanceType::LongTail => (0..num_classes)
                .map(|i| {
                    let exponent = if num_classes > 1 {
                        i as f64 / (num_classes - 1) as f64
                    } else {
                        0.0
                    };
                    (max_per_class as f64 * (1.0 / ratio).powf(exponent)).floor() as usize
                })
                .collect(),
            ImbalanceType::Step => {
                let tail = (max_per_class as f64 / ratio).floor() as usize;
                (0..num_classes)
                    .map(|i| if i < num_classes / 2 { max_per_class } else { tail })
                    .collect()
            }
        };
        Self::new(counts)
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Count for one class (0 for out-of-range classes)
    pub fn count(&self, class: usize) -> usize {
        self.counts.get(class).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn min_count(&self) -> usize {
        self.counts.iter().copied().min().unwrap_or(0)
    }

    /// True when every class has the same count
    pub fn is_balanced(&self) -> bool {
        self.counts.windows(2).all(|w| w[0] == w[1])
    }

    /// Head-to-tail ratio, `inf` when some class is empty
    pub fn imbalance_ratio(&self) -> f64 {
        let min = self.min_count();
        if min == 0 {
            return f64::INFINITY;
        }
        self.max_count() as f64 / min as f64
    }

    /// Probability that a sample of `class` keeps its original image
    ///
    /// Head classes are always kept; rarer classes are re-targeted more often.
    pub fn keep_probability(&self, class: usize) -> f64 {
        let max = self.max_count();
        if max == 0 {
            return 1.0;
        }
        self.count(class) as f64 / max as f64
    }

    /// Count surplus of the seed class over the target class
    pub fn delta(&self, seed_class: usize, target_class: usize) -> usize {
        self.count(seed_class).saturating_sub(self.count(target_class))
    }

    /// Acceptance weight `1 - beta^delta` for translating `seed_class` into `target_class`
    pub fn acceptance_weight(&self, seed_class: usize, target_class: usize, beta: f64) -> f64 {
        acceptance_weight(self.delta(seed_class, target_class), beta)
    }

    /// Class re-weighting by the effective number of samples
    ///
    /// `w_c = (1 - beta) / (1 - beta^n_c)`, normalised so the weights sum to the
    /// number of classes. `beta >= 1` falls back to inverse frequency.
    pub fn effective_number_weights(&self, beta: f64) -> Vec<f32> {
        let raw: Vec<f64> = self
            .counts
            .iter()
            .map(|&n| {
                let n = n.max(1) as f64;
                if beta < 1.0 {
                    (1.0 - beta) / (1.0 - beta.powf(n))
                } else {
                    1.0 / n
                }
            })
            .collect();
        let sum: f64 = raw.iter().sum();
        let scale = self.num_classes() as f64 / sum;
        raw.iter().map(|&w| (w * scale) as f32).collect()
    }

    /// Label-distribution-aware margins `m_c ∝ n_c^{-1/4}`, largest equal to `max_margin`
    pub fn ldam_margins(&self, max_margin: f32) -> Vec<f32> {
        let raw: Vec<f64> = self
            .counts
            .iter()
            .map(|&n| 1.0 / (n.max(1) as f64).sqrt().sqrt())
            .collect();
        let largest = raw.iter().copied().fold(0.0f64, f64::max);
        raw.iter()
            .map(|&m| (m * f64::from(max_margin) / largest) as f32)
            .collect()
    }

    /// Split classes into thirds by descending count
    pub fn class_groups(&self) -> Vec<ClassGroup> {
        let n = self.num_classes();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| self.counts[b].cmp(&self.counts[a]).then(a.cmp(&b)));

        let major_end = n.div_ceil(3);
        let neutral_end = (2 * n).div_ceil(3);
        let mut groups = vec![ClassGroup::Neutral; n];
        for (rank, &class) in order.iter().enumerate() {
            groups[class] = if rank < major_end {
                ClassGroup::Major
            } else if rank < neutral_end {
                ClassGroup::Neutral
            } else {
                ClassGroup::Minor
            };
        }
        groups
    }
}

/// Acceptance weight `1 - beta^delta`
///
/// Zero at `delta == 0`, non-decreasing in `delta`, approaching 1 for any
/// `beta` in `[0, 1)`.
pub fn acceptance_weight(delta: usize, beta: f64) -> f64 {
    if delta == 0 {
        return 0.0;
    }
    let exponent = i32::try_from(delta).unwrap_or(i32::MAX);
    (1.0 - beta.powi(exponent)).clamp(0.0, 1.0)
}
