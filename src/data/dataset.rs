//! In-memory image datasets

use super::batch::Batch;
use super::class_stats::ClassStatistics;
use crate::{Error, Result};
use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

/// Channel-major image shape; images are stored flattened as `C*H*W` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl ImageShape {
    pub fn new(channels: usize, height: usize, width: usize) -> Self {
        Self {
            channels,
            height,
            width,
        }
    }

    /// Number of pixels per channel
    pub fn plane_len(&self) -> usize {
        self.height * self.width
    }

    /// Flattened image length
    pub fn feature_len(&self) -> usize {
        self.channels * self.plane_len()
    }
}

impl Default for ImageShape {
    fn default() -> Self {
        Self::new(3, 8, 8)
    }
}

/// Labelled images held in memory
#[derive(Debug, Clone)]
pub struct Dataset {
    images: Array2<f32>,
    labels: Vec<usize>,
    shape: ImageShape,
    num_classes: usize,
}

/// On-disk JSON layout accepted by [`Dataset::from_json`]
#[derive(Debug, Serialize, Deserialize)]
struct DatasetFile {
    num_classes: usize,
    image_shape: ImageShape,
    samples: Vec<SampleRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SampleRecord {
    label: usize,
    pixels: Vec<f32>,
}

impl Dataset {
    /// Create a dataset, checking shapes, pixel range, and label range
    pub fn new(
        images: Array2<f32>,
        labels: Vec<usize>,
        shape: ImageShape,
        num_classes: usize,
    ) -> Result<Self> {
        if images.nrows() != labels.len() {
            return Err(Error::Shape {
                expected: format!("{} image rows", labels.len()),
                actual: format!("{}", images.nrows()),
            });
        }
        if images.ncols() != shape.feature_len() {
            return Err(Error::Shape {
                expected: format!("{} features per image", shape.feature_len()),
                actual: format!("{}", images.ncols()),
            });
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= num_classes) {
            return Err(Error::Data(format!(
                "label {bad} out of range for {num_classes} classes"
            )));
        }
        if images.iter().any(|&v| !(0.0..=1.0).contains(&v)) {
            return Err(Error::Data("pixel values must lie in [0, 1]".to_string()));
        }
        Ok(Self {
            images,
            labels,
            shape,
            num_classes,
        })
    }

    /// Load a dataset from JSON
    ///
    /// ```json
    /// { "num_classes": 2, "image_shape": {"channels": 1, "height": 2, "width": 2},
    ///   "samples": [ {"label": 0, "pixels": [0.0, 0.5, 1.0, 0.25]} ] }
    /// ```
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Data(format!("Failed to read dataset {}: {e}", path.display()))
        })?;
        let file: DatasetFile = serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("Failed to parse dataset JSON: {e}")))?;

        let feature_len = file.image_shape.feature_len();
        let mut flat = Vec::with_capacity(file.samples.len() * feature_len);
        let mut labels = Vec::with_capacity(file.samples.len());
        for (i, sample) in file.samples.into_iter().enumerate() {
            if sample.pixels.len() != feature_len {
                return Err(Error::Shape {
                    expected: format!("{feature_len} pixels"),
                    actual: format!("{} pixels in sample {i}", sample.pixels.len()),
                });
            }
            flat.extend(sample.pixels);
            labels.push(sample.label);
        }
        let images = Array2::from_shape_vec((labels.len(), feature_len), flat)
            .map_err(|e| Error::Data(format!("Failed to assemble images: {e}")))?;
        Self::new(images, labels, file.image_shape, file.num_classes)
    }

    /// Write the dataset as JSON in the layout read by [`Dataset::from_json`]
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = DatasetFile {
            num_classes: self.num_classes,
            image_shape: self.shape,
            samples: self
                .images
                .outer_iter()
                .zip(&self.labels)
                .map(|(row, &label)| SampleRecord {
                    label,
                    pixels: row.to_vec(),
                })
                .collect(),
        };
        let json = serde_json::to_string(&file)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Class-conditional synthetic images following a count schedule
    ///
    /// Each class gets a random prototype image; samples are the prototype plus
    /// Gaussian noise of standard deviation `noise`, clamped to `[0, 1]`.
    pub fn synthetic<R: Rng>(
        stats: &ClassStatistics,
        shape: ImageShape,
        noise: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let feature_len = shape.feature_len();
        let prototypes: Vec<Vec<f32>> = (0..stats.num_classes())
            .map(|_| (0..feature_len).map(|_| rng.random_range(0.2..0.8)).collect())
            .collect();

        let total = stats.total();
        let mut flat = Vec::with_capacity(total * feature_len);
        let mut labels = Vec::with_capacity(total);
        for (class, prototype) in prototypes.iter().enumerate() {
            for _ in 0..stats.count(class) {
                flat.extend(
                    prototype
                        .iter()
                        .map(|&p| (p + noise * standard_normal(rng)).clamp(0.0, 1.0)),
                );
                labels.push(class);
            }
        }
        let images = Array2::from_shape_vec((total, feature_len), flat)
            .map_err(|e| Error::Data(format!("Failed to assemble images: {e}")))?;
        Self::new(images, labels, shape, stats.num_classes())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn shape(&self) -> ImageShape {
        self.shape
    }

    pub fn images(&self) -> &Array2<f32> {
        &self.images
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Per-class counts of this dataset
    pub fn class_statistics(&self) -> Result<ClassStatistics> {
        ClassStatistics::from_labels(&self.labels, self.num_classes)
    }

    /// Gather the samples at `indices` into a batch
    pub fn batch(&self, indices: &[usize]) -> Batch {
        Batch::new(
            self.images.select(Axis(0), indices),
            indices.iter().map(|&i| self.labels[i]).collect(),
        )
    }

    fn subset(&self, indices: &[usize]) -> Self {
        let batch = self.batch(indices);
        Self {
            images: batch.images,
            labels: batch.labels,
            shape: self.shape,
            num_classes: self.num_classes,
        }
    }

    /// Keep the first `stats.count(c)` samples of every class `c`
    pub fn take_per_class(&self, stats: &ClassStatistics) -> Result<Self> {
        self.partition_per_class(stats).map(|(taken, _)| taken)
    }

    /// Split into the first `stats.count(c)` samples of every class `c` and
    /// everything else
    pub fn partition_per_class(&self, stats: &ClassStatistics) -> Result<(Self, Self)> {
        if stats.num_classes() != self.num_classes {
            return Err(Error::Data(format!(
                "schedule covers {} classes, dataset has {}",
                stats.num_classes(),
                self.num_classes
            )));
        }
        let mut taken = vec![0usize; self.num_classes];
        let mut indices = Vec::with_capacity(stats.total());
        let mut rest = Vec::new();
        for (i, &label) in self.labels.iter().enumerate() {
            if taken[label] < stats.count(label) {
                taken[label] += 1;
                indices.push(i);
            } else {
                rest.push(i);
            }
        }
        if let Some(class) = (0..self.num_classes).find(|&c| taken[c] < stats.count(c)) {
            return Err(Error::Data(format!(
                "class {class} has {} samples, schedule asks for {}",
                taken[class],
                stats.count(class)
            )));
        }
        Ok((self.subset(&indices), self.subset(&rest)))
    }

    /// Shuffle and split off `fraction` of the samples, stratified per class
    ///
    /// Returns `(remaining, held_out)`.
    pub fn split<R: Rng>(&self, fraction: f64, rng: &mut R) -> (Self, Self) {
        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); self.num_classes];
        for (i, &label) in self.labels.iter().enumerate() {
            by_class[label].push(i);
        }

        let mut kept = Vec::new();
        let mut held = Vec::new();
        for mut members in by_class {
            members.shuffle(rng);
            let n_held = (members.len() as f64 * fraction).round() as usize;
            let (h, k) = members.split_at(n_held.min(members.len()));
            held.extend_from_slice(h);
            kept.extend_from_slice(k);
        }
        kept.sort_unstable();
        held.sort_unstable();
        (self.subset(&kept), self.subset(&held))
    }
}

/// Standard normal draw (Box-Muller)
pub(crate) fn standard_normal<R: Rng>(rng: &mut R) -> f32 {
    let u1: f32 = rng.random::<f32>().max(1e-10);
    let u2: f32 = rng.random::<f32>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
