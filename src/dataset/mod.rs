//! Iris dataset acquisition and flat-file I/O.
//!
//! The on-disk format is a fixed 5-column CSV
//! (`sepal_length,sepal_width,petal_length,petal_width,target`) written by
//! the fetcher and consumed by the trainer. Parsing is strict: a malformed
//! row is an error naming the offending line, never a silent skip.

use thiserror::Error;

use crate::model::IrisFeatures;

pub mod csv;
pub mod fetch;

pub use csv::{read_csv, write_csv, CSV_HEADER};
pub use fetch::{DatasetFetcher, FetchSummary};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset file is empty")]
    EmptyFile,

    #[error("dataset has no data rows")]
    NoDataRows,

    #[error("unexpected header '{0}'")]
    BadHeader(String),

    #[error("line {line}: expected 5 columns, found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("line {line}: invalid {column} value '{value}'")]
    InvalidValue { line: usize, column: &'static str, value: String },

    #[error("http error: {0}")]
    Http(String),

    #[error("download of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// One labeled sample: four measurements and a class in `{0, 1, 2}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrisRecord {
    pub features: IrisFeatures,
    pub target: usize,
}

impl IrisRecord {
    pub fn new(features: IrisFeatures, target: usize) -> Self {
        Self { features, target }
    }
}

/// Unzip records into the parallel slices the classifiers train on.
pub fn features_and_targets(records: &[IrisRecord]) -> (Vec<IrisFeatures>, Vec<usize>) {
    records.iter().map(|r| (r.features, r.target)).unzip()
}
