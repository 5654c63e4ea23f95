//! Model registry with staging workflows
//!
//! Maps a model name and lifecycle stage to a specific versioned artifact.
//! Versions flow: None → Staging → Production → Archived, with rollback from
//! Production back to Staging. Version numbers increase monotonically;
//! re-registering a name always creates a new version.
//!
//! # Example
//!
//! ```
//! use cultivar::registry::{InMemoryRegistry, ModelRegistry, ModelStage};
//!
//! # fn main() -> cultivar::registry::Result<()> {
//! let mut registry = InMemoryRegistry::new();
//! let v = registry.register_model(
//!     "IrisClassifier",
//!     "runs:/run-00000000deadbeef/model",
//!     "run-00000000deadbeef",
//!     None,
//! )?;
//! registry.transition_stage("IrisClassifier", v.version, ModelStage::Staging)?;
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod uri;

pub use file::FileRegistry;
pub use uri::ModelUri;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Model lifecycle stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelStage {
    /// Not assigned to any stage
    None,
    /// Promoted candidate, ready to serve
    Staging,
    /// Deployed and serving traffic
    Production,
    /// Retired from active use
    Archived,
}

impl ModelStage {
    /// Check if transition to target stage is valid
    #[must_use]
    pub fn can_transition_to(&self, target: ModelStage) -> bool {
        match (self, target) {
            // Any stage can go to Archived
            (_, ModelStage::Archived) => true,
            // A fresh registration is promoted straight to Staging
            (ModelStage::None, ModelStage::Staging) => true,
            // Staging can go to Production
            (ModelStage::Staging, ModelStage::Production) => true,
            // Production can go back to Staging (rollback)
            (ModelStage::Production, ModelStage::Staging) => true,
            // Archived can be restored to Staging
            (ModelStage::Archived, ModelStage::Staging) => true,
            // Same stage is a no-op
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    /// Get display name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStage::None => "None",
            ModelStage::Staging => "Staging",
            ModelStage::Production => "Production",
            ModelStage::Archived => "Archived",
        }
    }
}

impl std::fmt::Display for ModelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelStage {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "None" => Ok(ModelStage::None),
            "Staging" => Ok(ModelStage::Staging),
            "Production" => Ok(ModelStage::Production),
            "Archived" => Ok(ModelStage::Archived),
            other => Err(RegistryError::UnknownStage(other.to_string())),
        }
    }
}

/// Model version metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    /// Model name
    pub name: String,
    /// Version number (monotonically increasing)
    pub version: u32,
    /// Current stage
    pub stage: ModelStage,
    /// URI the version was registered from (`runs:/<run_id>/model`)
    pub source_uri: String,
    /// Tracking run that produced the artifact
    pub run_id: String,
    /// Performance metrics
    pub metrics: HashMap<String, f64>,
    /// Tags for organization
    pub tags: HashMap<String, String>,
    /// Description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last promotion timestamp
    pub promoted_at: Option<DateTime<Utc>>,
}

impl ModelVersion {
    /// Create a new model version
    #[must_use]
    pub fn new(name: &str, version: u32, source_uri: &str, run_id: &str) -> Self {
        Self {
            name: name.to_string(),
            version,
            stage: ModelStage::None,
            source_uri: source_uri.to_string(),
            run_id: run_id.to_string(),
            metrics: HashMap::new(),
            tags: HashMap::new(),
            description: None,
            created_at: Utc::now(),
            promoted_at: None,
        }
    }

    /// Add a metric
    #[must_use]
    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    /// Set description
    #[must_use]
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }
}

/// Stage transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransition {
    /// Model name
    pub model_name: String,
    /// Version
    pub version: u32,
    /// Previous stage
    pub from_stage: ModelStage,
    /// New stage
    pub to_stage: ModelStage,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Version not found: {0} v{1}")]
    VersionNotFound(String, u32),

    #[error("Invalid stage transition from {0} to {1}")]
    InvalidTransition(ModelStage, ModelStage),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Invalid model URI: {0}")]
    InvalidUri(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Model registry trait
pub trait ModelRegistry: Send + Sync {
    /// Register a new model version under `name`
    ///
    /// Every call creates a fresh version, even for an identical source URI.
    fn register_model(
        &mut self,
        name: &str,
        source_uri: &str,
        run_id: &str,
        description: Option<&str>,
    ) -> Result<ModelVersion>;

    /// Get a model version
    fn get_model(&self, name: &str, version: u32) -> Result<ModelVersion>;

    /// Get latest version of a model
    fn get_latest(&self, name: &str) -> Result<ModelVersion>;

    /// Get latest version at a specific stage
    fn get_latest_by_stage(&self, name: &str, stage: ModelStage) -> Option<ModelVersion>;

    /// List all versions of a model
    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>>;

    /// Transition model to new stage
    fn transition_stage(&mut self, name: &str, version: u32, target_stage: ModelStage)
        -> Result<()>;

    /// Log metrics for a model version
    fn log_metrics(&mut self, name: &str, version: u32, metrics: HashMap<String, f64>)
        -> Result<()>;

    /// Get transition history for a model
    fn get_transition_history(&self, name: &str) -> Result<Vec<StageTransition>>;
}

/// In-memory model registry for testing
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    /// Models by name -> version -> ModelVersion
    models: HashMap<String, HashMap<u32, ModelVersion>>,
    /// Stage transition history
    transitions: Vec<StageTransition>,
}

impl InMemoryRegistry {
    /// Create a new in-memory registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get next version number for a model
    fn next_version(&self, name: &str) -> u32 {
        self.models.get(name).map_or(1, |versions| {
            versions.keys().max().copied().unwrap_or(0) + 1
        })
    }
}

impl ModelRegistry for InMemoryRegistry {
    fn register_model(
        &mut self,
        name: &str,
        source_uri: &str,
        run_id: &str,
        description: Option<&str>,
    ) -> Result<ModelVersion> {
        let version = self.next_version(name);
        let mut model = ModelVersion::new(name, version, source_uri, run_id);
        if let Some(desc) = description {
            model = model.with_description(desc);
        }

        self.models
            .entry(name.to_string())
            .or_default()
            .insert(version, model.clone());

        Ok(model)
    }

    fn get_model(&self, name: &str, version: u32) -> Result<ModelVersion> {
        self.models
            .get(name)
            .and_then(|versions| versions.get(&version))
            .cloned()
            .ok_or_else(|| RegistryError::VersionNotFound(name.to_string(), version))
    }

    fn get_latest(&self, name: &str) -> Result<ModelVersion> {
        self.models
            .get(name)
            .and_then(|versions| {
                let max_version = versions.keys().max()?;
                versions.get(max_version)
            })
            .cloned()
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))
    }

    fn get_latest_by_stage(&self, name: &str, stage: ModelStage) -> Option<ModelVersion> {
        self.models.get(name).and_then(|versions| {
            versions
                .values()
                .filter(|m| m.stage == stage)
                .max_by_key(|m| m.version)
                .cloned()
        })
    }

    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>> {
        self.models
            .get(name)
            .map(|versions| {
                let mut v: Vec<_> = versions.values().cloned().collect();
                v.sort_by_key(|m| m.version);
                v
            })
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))
    }

    fn transition_stage(
        &mut self,
        name: &str,
        version: u32,
        target_stage: ModelStage,
    ) -> Result<()> {
        let model = self
            .models
            .get_mut(name)
            .and_then(|versions| versions.get_mut(&version))
            .ok_or_else(|| RegistryError::VersionNotFound(name.to_string(), version))?;

        if !model.stage.can_transition_to(target_stage) {
            return Err(RegistryError::InvalidTransition(model.stage, target_stage));
        }

        let from_stage = model.stage;
        model.stage = target_stage;
        model.promoted_at = Some(Utc::now());

        // Record transition
        self.transitions.push(StageTransition {
            model_name: name.to_string(),
            version,
            from_stage,
            to_stage: target_stage,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    fn log_metrics(
        &mut self,
        name: &str,
        version: u32,
        metrics: HashMap<String, f64>,
    ) -> Result<()> {
        let model = self
            .models
            .get_mut(name)
            .and_then(|versions| versions.get_mut(&version))
            .ok_or_else(|| RegistryError::VersionNotFound(name.to_string(), version))?;

        model.metrics.extend(metrics);
        Ok(())
    }

    fn get_transition_history(&self, name: &str) -> Result<Vec<StageTransition>> {
        let history: Vec<_> = self
            .transitions
            .iter()
            .filter(|t| t.model_name == name)
            .cloned()
            .collect();

        if history.is_empty() && !self.models.contains_key(name) {
            return Err(RegistryError::ModelNotFound(name.to_string()));
        }

        Ok(history)
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Property Tests
// =============================================================================
