//! Persistence: JSON files, checkpoints, and the per-epoch CSV log

mod checkpoint;
mod csv_log;
mod save;

pub use checkpoint::{checkpoint_path, Checkpoint};
pub use csv_log::{CsvLogger, EpochLogRow, CSV_HEADER};
pub use save::{load_json, save_json};
