//! Experiment tracking
//!
//! Records training runs with their parameters, metrics, and artifacts.
//! Backed by pluggable storage via the [`TrackingBackend`](storage::TrackingBackend)
//! trait, so the pipeline commands and the tests share one code path.
//!
//! # Architecture
//!
//! - **`ExperimentTracker`**: top-level handle that manages runs for a named experiment
//! - **`Run`**: a single training invocation with parameters, metrics, and artifacts
//! - **`TrackingBackend`**: pluggable persistence (JSON files, in-memory)
//!
//! # Example
//!
//! ```
//! use cultivar::tracking::{ExperimentTracker, RunStatus};
//! use cultivar::tracking::storage::InMemoryBackend;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let backend = InMemoryBackend::new();
//! let mut tracker = ExperimentTracker::new("iris", backend);
//! tracker.add_tag("dataset", "iris");
//!
//! let run_id = tracker.start_run(Some("logistic-regression"))?;
//! tracker.log_param(&run_id, "max_iter", "200")?;
//! tracker.log_metric(&run_id, "accuracy", 0.97, 0)?;
//! tracker.log_artifact(&run_id, "model.json")?;
//! tracker.end_run(&run_id, RunStatus::Completed)?;
//!
//! let best = tracker.find_best_run("accuracy")?.expect("one completed run");
//! assert_eq!(best.run_id, run_id);
//! # Ok(())
//! # }
//! ```

pub mod storage;


use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storage::{TrackingBackend, TrackingStorageError};

/// Status of a tracking run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is actively recording
    Active,
    /// Run completed successfully
    Completed,
    /// Run failed
    Failed,
}

/// A single experiment run
///
/// Tracks parameters (hyperparameters), metrics (per-step values),
/// artifacts (file paths), and tags (key-value metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique identifier for the run
    pub run_id: String,
    /// Optional human-readable name
    pub run_name: Option<String>,
    /// Parent experiment name
    pub experiment_name: String,
    /// Current status
    pub status: RunStatus,
    /// Hyperparameters: key -> value (string-encoded)
    pub params: HashMap<String, String>,
    /// Metrics: key -> list of (value, step)
    pub metrics: HashMap<String, Vec<(f64, u64)>>,
    /// Artifact paths
    pub artifacts: Vec<String>,
    /// Tags: key -> value
    pub tags: HashMap<String, String>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run ended
    pub ended_at: Option<DateTime<Utc>>,
}

impl Run {
    fn new(run_id: String, run_name: Option<String>, experiment_name: String) -> Self {
        Self {
            run_id,
            run_name,
            experiment_name,
            status: RunStatus::Active,
            params: HashMap::new(),
            metrics: HashMap::new(),
            artifacts: Vec::new(),
            tags: HashMap::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Latest recorded value for a metric key (highest step wins; ties
    /// resolve to the most recently appended point).
    #[must_use]
    pub fn latest_metric(&self, key: &str) -> Option<f64> {
        self.metrics
            .get(key)
            .and_then(|points| points.iter().max_by_key(|(_, step)| *step))
            .map(|(value, _)| *value)
    }
}

/// Errors from experiment tracking operations
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Run is not active: {0}")]
    RunNotActive(String),

    #[error("Storage error: {0}")]
    Storage(#[from] TrackingStorageError),
}

/// Result alias for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Experiment tracker
///
/// Manages runs under a single experiment name. Persists run data through a
/// pluggable [`TrackingBackend`]. Run IDs are random, so trackers opened by
/// separate processes against the same backend never collide.
#[derive(Debug)]
pub struct ExperimentTracker<B: TrackingBackend> {
    experiment_name: String,
    tags: HashMap<String, String>,
    backend: B,
    /// Active runs held in memory for fast mutation
    active_runs: HashMap<String, Run>,
}

impl<B: TrackingBackend> ExperimentTracker<B> {
    /// Create a new tracker for the given experiment name
    pub fn new(experiment_name: impl Into<String>, backend: B) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            tags: HashMap::new(),
            backend,
            active_runs: HashMap::new(),
        }
    }

    /// Add an experiment-level tag
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Get the experiment name
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Get experiment-level tags
    #[must_use]
    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    /// Start a new run, optionally with a human-readable name
    ///
    /// Returns the run ID.
    pub fn start_run(&mut self, run_name: Option<&str>) -> Result<String> {
        let run_id = format!("run-{:016x}", rand::random::<u64>());

        let mut run = Run::new(
            run_id.clone(),
            run_name.map(String::from),
            self.experiment_name.clone(),
        );
        // Inherit experiment-level tags
        for (k, v) in &self.tags {
            run.tags.insert(k.clone(), v.clone());
        }

        self.active_runs.insert(run_id.clone(), run);
        Ok(run_id)
    }

    /// End a run with the given status, persisting it to the backend
    pub fn end_run(&mut self, run_id: &str, status: RunStatus) -> Result<()> {
        let mut run = self
            .active_runs
            .remove(run_id)
            .ok_or_else(|| TrackingError::RunNotFound(run_id.to_string()))?;

        run.status = status;
        run.ended_at = Some(Utc::now());

        self.backend.save_run(&run)?;
        Ok(())
    }

    /// Log a single parameter (hyperparameter)
    pub fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        let run = self
            .active_runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))?;

        run.params.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Log multiple parameters at once
    pub fn log_params(&mut self, run_id: &str, params: &HashMap<String, String>) -> Result<()> {
        let run = self
            .active_runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))?;

        for (k, v) in params {
            run.params.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    /// Log a metric value at a given step
    pub fn log_metric(&mut self, run_id: &str, key: &str, value: f64, step: u64) -> Result<()> {
        let run = self
            .active_runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))?;

        run.metrics
            .entry(key.to_string())
            .or_default()
            .push((value, step));
        Ok(())
    }

    /// Log an artifact path
    pub fn log_artifact(&mut self, run_id: &str, path: &str) -> Result<()> {
        let run = self
            .active_runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))?;

        run.artifacts.push(path.to_string());
        Ok(())
    }

    /// Retrieve a run by ID
    ///
    /// Checks active (in-memory) runs first, then falls back to the backend.
    pub fn get_run(&self, run_id: &str) -> Result<Run> {
        if let Some(run) = self.active_runs.get(run_id) {
            return Ok(run.clone());
        }
        self.backend
            .load_run(run_id)
            .map_err(|e| TrackingError::RunNotFound(format!("{run_id}: {e}")))
    }

    /// List all runs (active + persisted)
    pub fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.active_runs.values().cloned().collect();
        let persisted = self.backend.list_runs()?;
        // Avoid duplicates: only add persisted runs whose IDs are not active
        for r in persisted {
            if !self.active_runs.contains_key(&r.run_id) {
                runs.push(r);
            }
        }
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }

    /// Find the completed run with the highest latest value of `metric`
    ///
    /// Only runs belonging to this tracker's experiment are considered;
    /// active and failed runs never win. Ties resolve to the lexically
    /// greatest run ID so repeated searches are deterministic. Returns
    /// `Ok(None)` when no completed run has recorded the metric.
    pub fn find_best_run(&self, metric: &str) -> Result<Option<Run>> {
        let mut best: Option<(f64, Run)> = None;
        for run in self.list_runs()? {
            if run.experiment_name != self.experiment_name
                || run.status != RunStatus::Completed
            {
                continue;
            }
            let Some(value) = run.latest_metric(metric) else {
                continue;
            };
            // NaN never wins
            if !value.is_finite() {
                continue;
            }
            let better = match &best {
                None => true,
                Some((best_value, best_run)) => {
                    value > *best_value
                        || (value == *best_value && run.run_id > best_run.run_id)
                }
            };
            if better {
                best = Some((value, run));
            }
        }
        Ok(best.map(|(_, run)| run))
    }
}
