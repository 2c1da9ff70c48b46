//! Equilibrar CLI
//!
//! # Usage
//!
//! ```bash
//! # Run an experiment
//! equilibrar train experiment.yaml
//!
//! # Run with overrides
//! equilibrar train experiment.yaml --epochs 10 --lr 0.05 --seed 1
//!
//! # Validate config
//! equilibrar validate experiment.yaml
//!
//! # Show config info
//! equilibrar info experiment.yaml --format yaml
//! ```

use clap::Parser;
use equilibrar::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
