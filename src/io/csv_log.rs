//! Per-epoch CSV log

use crate::eval::EvalReport;
use crate::train::EpochResult;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Column names, in order
pub const CSV_HEADER: [&str; 17] = [
    "epoch",
    "train loss",
    "gen loss",
    "train acc",
    "gen_acc",
    "prob_orig",
    "prob_targ",
    "train bal acc",
    "train gm",
    "test loss",
    "major test acc",
    "neutral test acc",
    "minor test acc",
    "test acc",
    "f1 score",
    "test gm",
    "test bal acc",
];

/// One row of the log
///
/// Accuracy-like columns are percentages; losses and probabilities are raw.
/// Test columns repeat the latest test evaluation, zero before the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochLogRow {
    pub epoch: usize,
    pub train_loss: f64,
    pub gen_loss: f64,
    pub train_acc: f64,
    pub gen_acc: f64,
    pub prob_orig: f64,
    pub prob_targ: f64,
    pub train_bal_acc: f64,
    pub train_gm: f64,
    pub test_loss: f64,
    pub major_acc: f64,
    pub neutral_acc: f64,
    pub minor_acc: f64,
    pub test_acc: f64,
    pub f1_score: f64,
    pub test_gm: f64,
    pub test_bal_acc: f64,
}

impl EpochLogRow {
    pub fn new(epoch: usize, train: &EpochResult, test: Option<&EvalReport>) -> Self {
        let test = test.cloned().unwrap_or_default();
        Self {
            epoch,
            train_loss: train.train_loss,
            gen_loss: train.gen_loss,
            train_acc: 100.0 * train.train_acc,
            gen_acc: 100.0 * train.gen_acc,
            prob_orig: train.prob_orig,
            prob_targ: train.prob_targ,
            train_bal_acc: 100.0 * train.balanced_accuracy,
            train_gm: 100.0 * train.geometric_mean,
            test_loss: test.loss,
            major_acc: 100.0 * test.major_acc,
            neutral_acc: 100.0 * test.neutral_acc,
            minor_acc: 100.0 * test.minor_acc,
            test_acc: 100.0 * test.acc,
            f1_score: 100.0 * test.f1_score,
            test_gm: 100.0 * test.gmean,
            test_bal_acc: 100.0 * test.balanced_accuracy,
        }
    }
}

/// Appends [`EpochLogRow`]s to a CSV file whose header is written once
#[derive(Debug, Clone)]
pub struct CsvLogger {
    path: PathBuf,
}

impl CsvLogger {
    /// Open `path`, writing the header if the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(CSV_HEADER)?;
            writer.flush()?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, row: &EpochLogRow) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }

    /// Read every row back
    pub fn read_rows(&self) -> Result<Vec<EpochLogRow>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.deserialize(None)?);
        }
        Ok(rows)
    }
}
