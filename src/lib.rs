//! # Cultivar
//!
//! Experiment tracking, model registry, and HTTP serving for a tabular
//! classification pipeline.
//!
//! The pipeline runs as four commands over one file-backed store:
//!
//! 1. **fetch** downloads the raw Iris CSV
//! 2. **train** fits two model families and tracks each run
//! 3. **register** promotes the best run into the model registry
//! 4. **serve** exposes the staged model over HTTP
//!
//! Stages coordinate only through the store directory, so each command can
//! run in its own process on its own schedule.
//!
//! ## Example
//!
//! ```no_run
//! use cultivar::registry::ModelStage;
//! use cultivar::store::Store;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::resolve(None)?;
//! let model = store.load_staged_model("IrisClassifier", ModelStage::Staging)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dataset;
pub mod model;
pub mod monitor;
pub mod registry;
pub mod server;
pub mod store;
pub mod tracking;
