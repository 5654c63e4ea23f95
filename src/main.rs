//! Cultivar CLI
//!
//! Pipeline entry point: fetch data, train candidates, register the best
//! model, serve it over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Download the raw dataset
//! cultivar fetch
//!
//! # Train both model families and track the runs
//! cultivar train
//!
//! # Promote the best run to the registry
//! cultivar register
//!
//! # Serve the staged model
//! cultivar serve
//!
//! # Point every stage at a shared store
//! CULTIVAR_TRACKING_URI=file:///var/lib/cultivar cultivar train
//! ```

use clap::Parser;
use cultivar::cli::{run_command, Cli};
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
