//! Project configuration: pipeline constants and the command-line surface.

mod cli;

pub use cli::{parse_args, Cli, Command, FetchArgs, RegisterArgs, ServeArgs, TrainArgs};

/// Name every pipeline stage registers and serves the classifier under.
pub const MODEL_NAME: &str = "IrisClassifier";

/// Stage a freshly registered version is promoted to, and the stage the
/// serving process loads from.
pub const SERVING_STAGE: &str = "Staging";

/// Experiment that training runs are logged under by default.
pub const DEFAULT_EXPERIMENT: &str = "iris";

/// Environment variable naming the tracking store (`file://<path>` or a
/// plain path). Checked when no `--store` flag is given.
pub const TRACKING_URI_ENV: &str = "CULTIVAR_TRACKING_URI";

/// Store location used when neither the flag nor the environment variable
/// is set.
pub const DEFAULT_STORE_URI: &str = "./cultivar-store";

/// Default bind address for the serving API.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Canonical iris CSV bundled with scikit-learn.
pub const DATASET_URL: &str =
    "https://raw.githubusercontent.com/scikit-learn/scikit-learn/main/sklearn/datasets/data/iris.csv";

/// Where the fetcher writes and the trainer reads the dataset.
pub const DEFAULT_DATA_PATH: &str = "data/raw/iris.csv";
