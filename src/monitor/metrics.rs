//! Serving-process counters with Prometheus text export.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters for the prediction API
///
/// One instance lives for the whole serving process, shared across handler
/// tasks behind the server state. Increments are relaxed atomics; the
/// counters are monotonic and never reset.
#[derive(Debug)]
pub struct ServingMetrics {
    predictions: AtomicU64,
    requests: AtomicU64,
    started_at: Instant,
}

impl ServingMetrics {
    /// Create zeroed counters; uptime starts now
    #[must_use]
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Count one handled HTTP request, whatever the route
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one served prediction
    pub fn record_prediction(&self) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Predictions served since startup
    #[must_use]
    pub fn predictions(&self) -> u64 {
        self.predictions.load(Ordering::Relaxed)
    }

    /// Requests handled since startup
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Whole seconds since the serving process started
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Render all series in Prometheus text exposition format
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP cultivar_predictions_total Predictions served since startup\n");
        output.push_str("# TYPE cultivar_predictions_total counter\n");
        output.push_str(&format!("cultivar_predictions_total {}\n", self.predictions()));

        output.push_str("# HELP cultivar_requests_total HTTP requests handled since startup\n");
        output.push_str("# TYPE cultivar_requests_total counter\n");
        output.push_str(&format!("cultivar_requests_total {}\n", self.requests()));

        output.push_str("# HELP cultivar_uptime_seconds Seconds since the server started\n");
        output.push_str("# TYPE cultivar_uptime_seconds gauge\n");
        output.push_str(&format!("cultivar_uptime_seconds {}\n", self.uptime_secs()));

        output
    }
}

impl Default for ServingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Property Tests
// =============================================================================
