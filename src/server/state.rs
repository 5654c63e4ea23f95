//! Shared application state

use std::sync::Arc;

use crate::model::Predictor;
use crate::monitor::ServingMetrics;

/// State shared by all request handlers.
///
/// Wraps the loaded model and the serving counters behind one `Arc` so
/// cloning per request stays cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    predictor: Arc<dyn Predictor>,
    metrics: ServingMetrics,
}

impl AppState {
    /// Build state around a loaded model
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                predictor,
                metrics: ServingMetrics::new(),
            }),
        }
    }

    /// The model answering predictions
    pub fn predictor(&self) -> &dyn Predictor {
        self.inner.predictor.as_ref()
    }

    /// Serving counters
    pub fn metrics(&self) -> &ServingMetrics {
        &self.inner.metrics
    }
}
