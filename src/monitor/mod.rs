//! Observability for the serving process.
//!
//! Request and prediction counters plus uptime, exported in Prometheus
//! text exposition format from the `/metrics` route.

pub mod metrics;

pub use metrics::ServingMetrics;
