//! Outcome of a complete run

use crate::eval::EvalReport;
use crate::train::EpochResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of [`Runner::run`](super::Runner::run)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Epochs executed by this call
    pub epochs_run: usize,
    /// Best validation balanced accuracy, in `[0, 1]`
    pub best_val_bal_acc: f64,
    /// Epoch at which the best validation score was reached
    pub best_epoch: Option<usize>,
    /// Test metrics of the best model
    pub test: Option<EvalReport>,
    /// Training statistics of the last epoch
    pub last_epoch: Option<EpochResult>,
    pub run_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes() {
        let summary = RunSummary {
            epochs_run: 2,
            best_val_bal_acc: 0.5,
            best_epoch: Some(1),
            test: Some(EvalReport::default()),
            last_epoch: None,
            run_dir: PathBuf::from("runs/x"),
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
