//! Batch data structure

use ndarray::{Array2, Axis};

/// A training batch of flattened images and their class labels
///
/// Row `i` of `images` holds the pixels of sample `i` in `[0, 1]`, labelled
/// `labels[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    /// Flattened images, one row per sample
    pub images: Array2<f32>,
    /// Class labels
    pub labels: Vec<usize>,
}

impl Batch {
    /// Create a new batch
    ///
    /// # Panics
    ///
    /// Panics if the number of image rows and labels differ.
    pub fn new(images: Array2<f32>, labels: Vec<usize>) -> Self {
        assert_eq!(
            images.nrows(),
            labels.len(),
            "Images and labels must have same length"
        );
        Self { images, labels }
    }

    /// Number of samples
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Flattened image length
    pub fn feature_len(&self) -> usize {
        self.images.ncols()
    }

    /// Gather the samples at `indices` into a new batch
    pub fn select(&self, indices: &[usize]) -> Batch {
        Batch {
            images: self.images.select(Axis(0), indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}
