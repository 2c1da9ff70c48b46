//! Mini-batch loaders over an in-memory dataset

use super::batch::Batch;
use super::dataset::Dataset;
use crate::{Error, Result};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::SliceRandom;
use rand::Rng;

/// How sample order is drawn for an epoch
#[derive(Debug, Clone, PartialEq)]
pub enum Sampling {
    /// Dataset order, for evaluation
    Sequential,
    /// A fresh permutation every epoch
    Shuffle,
    /// `len` draws with replacement, each class equally likely
    ClassBalanced(Vec<f64>),
}

/// Restartable mini-batch loader
///
/// Every call to [`DataLoader::epoch`] starts a new pass over the data.
#[derive(Debug, Clone)]
pub struct DataLoader<'a> {
    dataset: &'a Dataset,
    batch_size: usize,
    sampling: Sampling,
}

impl<'a> DataLoader<'a> {
    /// Shuffled loader
    pub fn new(dataset: &'a Dataset, batch_size: usize) -> Self {
        Self {
            dataset,
            batch_size: batch_size.max(1),
            sampling: Sampling::Shuffle,
        }
    }

    /// Loader in dataset order
    pub fn sequential(dataset: &'a Dataset, batch_size: usize) -> Self {
        Self {
            sampling: Sampling::Sequential,
            ..Self::new(dataset, batch_size)
        }
    }

    /// Over-sampling loader drawing every class with equal probability
    pub fn oversampled(dataset: &'a Dataset, batch_size: usize) -> Result<Self> {
        let stats = dataset.class_statistics()?;
        let weights: Vec<f64> = dataset
            .labels()
            .iter()
            .map(|&label| 1.0 / stats.count(label) as f64)
            .collect();
        if weights.is_empty() {
            return Err(Error::Data("cannot over-sample an empty dataset".to_string()));
        }
        Ok(Self {
            sampling: Sampling::ClassBalanced(weights),
            ..Self::new(dataset, batch_size)
        })
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn sampling(&self) -> &Sampling {
        &self.sampling
    }

    /// Number of batches per epoch (the last batch may be short)
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// Start a new pass over the data
    pub fn epoch<R: Rng>(&self, rng: &mut R) -> Batches<'a> {
        let n = self.dataset.len();
        let order = match &self.sampling {
            Sampling::Sequential => (0..n).collect(),
            Sampling::Shuffle => {
                let mut order: Vec<usize> = (0..n).collect();
                order.shuffle(rng);
                order
            }
            Sampling::ClassBalanced(weights) => match WeightedIndex::new(weights) {
                Ok(dist) => (0..n).map(|_| dist.sample(rng)).collect(),
                Err(_) => (0..n).collect(),
            },
        };
        Batches {
            dataset: self.dataset,
            order,
            batch_size: self.batch_size,
            cursor: 0,
        }
    }
}

/// Batches of a single pass
#[derive(Debug)]
pub struct Batches<'a> {
    dataset: &'a Dataset,
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let batch = self.dataset.batch(&self.order[self.cursor..end]);
        self.cursor = end;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.order.len() - self.cursor).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches<'_> {}
