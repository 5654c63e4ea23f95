//! Command-line types: one subcommand per pipeline stage.
//!
//! Every argument has a default, so each stage runs bare:
//! `cultivar fetch`, `cultivar train`, `cultivar register`, `cultivar serve`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::{
    DATASET_URL, DEFAULT_BIND_ADDR, DEFAULT_DATA_PATH, DEFAULT_EXPERIMENT, MODEL_NAME,
    SERVING_STAGE,
};

/// Cultivar: iris classifier pipeline
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "cultivar")]
#[command(version)]
#[command(about = "Iris classifier pipeline: fetch data, train, register, serve")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Download the iris dataset and write it as a local CSV
    Fetch(FetchArgs),

    /// Train classifiers on the dataset and log runs to the store
    Train(TrainArgs),

    /// Register the best run's model and promote it to Staging
    Register(RegisterArgs),

    /// Serve the staged model over HTTP
    Serve(ServeArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct FetchArgs {
    /// Source URL for the raw dataset
    #[arg(long, default_value = DATASET_URL)]
    pub url: String,

    /// Where to write the dataset CSV
    #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
    pub output: PathBuf,
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Input dataset CSV
    #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Experiment to log runs under
    #[arg(short, long, default_value = DEFAULT_EXPERIMENT)]
    pub experiment: String,

    /// Tracking store URI (default: $CULTIVAR_TRACKING_URI, then ./cultivar-store)
    #[arg(long)]
    pub store: Option<String>,

    /// Held-out fraction for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Seed for the shuffle split and bootstrap sampling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Gradient descent iterations for logistic regression
    #[arg(long, default_value_t = 200)]
    pub max_iter: usize,

    /// Learning rate for logistic regression
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    pub n_estimators: usize,

    /// Maximum depth of each tree
    #[arg(long, default_value_t = 10)]
    pub max_depth: usize,
}

/// Arguments for the register command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RegisterArgs {
    /// Experiment to search for the best run
    #[arg(short, long, default_value = DEFAULT_EXPERIMENT)]
    pub experiment: String,

    /// Metric that decides which run is best
    #[arg(short, long, default_value = "accuracy")]
    pub metric: String,

    /// Name to register the model under
    #[arg(short, long, default_value = MODEL_NAME)]
    pub name: String,

    /// Tracking store URI (default: $CULTIVAR_TRACKING_URI, then ./cultivar-store)
    #[arg(long)]
    pub store: Option<String>,
}

/// Arguments for the serve command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ServeArgs {
    /// Bind address
    #[arg(short, long, default_value = DEFAULT_BIND_ADDR)]
    pub address: String,

    /// Model name to load from the registry
    #[arg(short, long, default_value = MODEL_NAME)]
    pub name: String,

    /// Stage to load the model from
    #[arg(long, default_value = SERVING_STAGE)]
    pub stage: String,

    /// Tracking store URI (default: $CULTIVAR_TRACKING_URI, then ./cultivar-store)
    #[arg(long)]
    pub store: Option<String>,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
