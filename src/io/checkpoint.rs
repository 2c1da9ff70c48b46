//! Training checkpoints

use super::save::{load_json, save_json};
use crate::model::ModelState;
use crate::optim::SgdState;
use crate::Result;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything needed to resume a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Live network
    pub model: ModelState,
    pub optimizer: SgdState,
    /// Last completed epoch
    pub epoch: usize,
    /// Score that triggered the save
    pub acc: f64,
    /// Runner RNG at the time of the save; a resumed run continues this stream
    pub rng: ChaCha12Rng,
    /// Trained seed network, when generation ran with one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_model: Option<ModelState>,
}

impl Checkpoint {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path)
    }
}

/// `<dir>/ckpt_<seed>.json`, or `<dir>/ckpt_epoch<E>_<seed>.json` when indexed
pub fn checkpoint_path(dir: impl AsRef<Path>, seed: u64, epoch: Option<usize>) -> PathBuf {
    let name = match epoch {
        Some(epoch) => format!("ckpt_epoch{epoch}_{seed}.json"),
        None => format!("ckpt_{seed}.json"),
    };
    dir.as_ref().join(name)
}
