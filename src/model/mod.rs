//! Iris classifiers and the artifact format they are saved in.
//!
//! Two model families are trained from the same flat feature vectors:
//! multinomial [`LogisticRegression`] and a bootstrap-aggregated
//! [`RandomForest`] of gini [`DecisionTree`]s. Either one is wrapped in a
//! [`TrainedModel`] for serialization and served behind the object-safe
//! [`Predictor`] trait.
//!
//! # Example
//!
//! ```
//! use cultivar::model::{IrisFeatures, LogisticRegression, Predictor, TrainedModel};
//!
//! let features = vec![
//!     IrisFeatures::new(5.1, 3.5, 1.4, 0.2),
//!     IrisFeatures::new(6.7, 3.0, 5.2, 2.3),
//! ];
//! let labels = vec![0, 1];
//!
//! let mut classifier = LogisticRegression::new(200, 0.1);
//! classifier.fit(&features, &labels).unwrap();
//!
//! let model = TrainedModel::LogisticRegression(classifier);
//! assert_eq!(model.predict(&features).len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod forest;
pub mod io;
pub mod logistic;
pub mod metrics;
pub mod split;
pub mod tree;

pub use forest::RandomForest;
pub use io::{file_digest, load_model, save_model, ARTIFACT_FORMAT_VERSION};
pub use logistic::LogisticRegression;
pub use metrics::accuracy;
pub use split::train_test_split;
pub use tree::DecisionTree;

/// Number of input features per sample.
pub const N_FEATURES: usize = 4;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("input lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("test_size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),

    #[error("split needs at least 2 samples, got {0}")]
    TooFewSamples(usize),

    #[error("accuracy requires at least one prediction")]
    EmptyPredictions,

    #[error("model is not fitted")]
    NotFitted,

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("unsupported model format version {0}")]
    UnsupportedFormatVersion(u32),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;

// ============================================================================
// Feature vector
// ============================================================================

/// One iris measurement, in centimeters.
///
/// Field names match both the CSV column headers and the JSON keys of the
/// prediction request body, so the same struct flows from dataset to wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrisFeatures {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl IrisFeatures {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self { sepal_length, sepal_width, petal_length, petal_width }
    }

    /// Flatten to the fixed feature order used by every classifier.
    pub fn as_array(&self) -> [f64; N_FEATURES] {
        [self.sepal_length, self.sepal_width, self.petal_length, self.petal_width]
    }
}

// ============================================================================
// Predictor trait
// ============================================================================

/// Object-safe prediction interface shared by all classifiers.
///
/// The serving layer holds an `Arc<dyn Predictor>` loaded once at startup
/// and never mutated afterwards, so the trait is read-only and `Send + Sync`.
pub trait Predictor: Send + Sync {
    /// Predict a class label in `{0, 1, 2}` for each sample in the batch.
    fn predict(&self, batch: &[IrisFeatures]) -> Vec<usize>;

    /// Short identifier for logs (e.g. `"random_forest"`).
    fn name(&self) -> &str;
}

// ============================================================================
// Trained model envelope
// ============================================================================

/// A fitted classifier, tagged by family for serialization.
///
/// The `model_type` tag keeps saved artifacts self-describing: a loaded
/// file announces which classifier it carries without a side channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum TrainedModel {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl TrainedModel {
    /// Stable identifier matching the serialized `model_type` tag.
    pub fn model_type(&self) -> &'static str {
        match self {
            TrainedModel::LogisticRegression(_) => "logistic_regression",
            TrainedModel::RandomForest(_) => "random_forest",
        }
    }

    /// Number of input features the model expects.
    pub fn n_features(&self) -> usize {
        N_FEATURES
    }

    /// Fit the wrapped classifier on a labeled training set.
    pub fn fit(&mut self, features: &[IrisFeatures], labels: &[usize]) -> Result<()> {
        match self {
            TrainedModel::LogisticRegression(m) => m.fit(features, labels),
            TrainedModel::RandomForest(m) => m.fit(features, labels),
        }
    }

    /// Check that the model is fitted and all learned values are finite.
    ///
    /// Run after deserialization: a corrupt or hand-edited artifact must be
    /// rejected before it is ever asked for a prediction.
    pub fn validate(&self) -> Result<()> {
        match self {
            TrainedModel::LogisticRegression(m) => m.validate(),
            TrainedModel::RandomForest(m) => m.validate(),
        }
    }
}

impl Predictor for TrainedModel {
    fn predict(&self, batch: &[IrisFeatures]) -> Vec<usize> {
        match self {
            TrainedModel::LogisticRegression(m) => m.predict(batch),
            TrainedModel::RandomForest(m) => m.predict(batch),
        }
    }

    fn name(&self) -> &str {
        self.model_type()
    }
}
