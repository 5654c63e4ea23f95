//! File-backed model registry
//!
//! Persists each model name as a single JSON document (`{name}.json`) holding
//! its versions and transition history. Separate pipeline invocations open
//! their own `FileRegistry` over the same directory and observe each other's
//! registrations through the files alone.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{ModelRegistry, ModelStage, ModelVersion, RegistryError, Result, StageTransition};

/// On-disk document for one registered model name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ModelRecord {
    versions: Vec<ModelVersion>,
    transitions: Vec<StageTransition>,
}

impl ModelRecord {
    fn next_version(&self) -> u32 {
        self.versions.iter().map(|m| m.version).max().unwrap_or(0) + 1
    }

    fn find(&self, version: u32) -> Option<&ModelVersion> {
        self.versions.iter().find(|m| m.version == version)
    }

    fn find_mut(&mut self, version: u32) -> Option<&mut ModelVersion> {
        self.versions.iter_mut().find(|m| m.version == version)
    }
}

/// JSON file-based model registry
///
/// # Example
///
/// ```no_run
/// use cultivar::registry::{FileRegistry, ModelRegistry, ModelStage};
///
/// # fn main() -> cultivar::registry::Result<()> {
/// let mut registry = FileRegistry::new("cultivar-store/registry");
/// let v = registry.register_model("IrisClassifier", "runs:/run-1/model", "run-1", None)?;
/// registry.transition_stage("IrisClassifier", v.version, ModelStage::Staging)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileRegistry {
    dir: PathBuf,
}

impl FileRegistry {
    /// Create a new file registry; the directory is created on first write
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn model_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    fn load_record(&self, name: &str) -> Result<Option<ModelRecord>> {
        let path = self.model_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        let record: ModelRecord = serde_json::from_str(&json)?;
        Ok(Some(record))
    }

    fn save_record(&self, name: &str, record: &ModelRecord) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.model_path(name), json)?;
        Ok(())
    }
}

impl ModelRegistry for FileRegistry {
    fn register_model(
        &mut self,
        name: &str,
        source_uri: &str,
        run_id: &str,
        description: Option<&str>,
    ) -> Result<ModelVersion> {
        let mut record = self.load_record(name)?.unwrap_or_default();

        let version = record.next_version();
        let mut model = ModelVersion::new(name, version, source_uri, run_id);
        if let Some(desc) = description {
            model = model.with_description(desc);
        }

        record.versions.push(model.clone());
        self.save_record(name, &record)?;
        Ok(model)
    }

    fn get_model(&self, name: &str, version: u32) -> Result<ModelVersion> {
        self.load_record(name)?
            .and_then(|record| record.find(version).cloned())
            .ok_or_else(|| RegistryError::VersionNotFound(name.to_string(), version))
    }

    fn get_latest(&self, name: &str) -> Result<ModelVersion> {
        self.load_record(name)?
            .and_then(|record| {
                record
                    .versions
                    .iter()
                    .max_by_key(|m| m.version)
                    .cloned()
            })
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))
    }

    fn get_latest_by_stage(&self, name: &str, stage: ModelStage) -> Option<ModelVersion> {
        self.load_record(name).ok().flatten().and_then(|record| {
            record
                .versions
                .iter()
                .filter(|m| m.stage == stage)
                .max_by_key(|m| m.version)
                .cloned()
        })
    }

    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>> {
        let record = self
            .load_record(name)?
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))?;

        let mut versions = record.versions;
        versions.sort_by_key(|m| m.version);
        Ok(versions)
    }

    fn transition_stage(
        &mut self,
        name: &str,
        version: u32,
        target_stage: ModelStage,
    ) -> Result<()> {
        let mut record = self
            .load_record(name)?
            .ok_or_else(|| RegistryError::VersionNotFound(name.to_string(), version))?;

        let model = record
            .find_mut(version)
            .ok_or_else(|| RegistryError::VersionNotFound(name.to_string(), version))?;

        if !model.stage.can_transition_to(target_stage) {
            return Err(RegistryError::InvalidTransition(model.stage, target_stage));
        }

        let from_stage = model.stage;
        model.stage = target_stage;
        model.promoted_at = Some(Utc::now());

        record.transitions.push(StageTransition {
            model_name: name.to_string(),
            version,
            from_stage,
            to_stage: target_stage,
            timestamp: Utc::now(),
        });

        self.save_record(name, &record)?;
        Ok(())
    }

    fn log_metrics(
        &mut self,
        name: &str,
        version: u32,
        metrics: HashMap<String, f64>,
    ) -> Result<()> {
        let mut record = self
            .load_record(name)?
            .ok_or_else(|| RegistryError::VersionNotFound(name.to_string(), version))?;

        let model = record
            .find_mut(version)
            .ok_or_else(|| RegistryError::VersionNotFound(name.to_string(), version))?;

        model.metrics.extend(metrics);
        self.save_record(name, &record)?;
        Ok(())
    }

    fn get_transition_history(&self, name: &str) -> Result<Vec<StageTransition>> {
        let record = self
            .load_record(name)?
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))?;
        Ok(record.transitions)
    }
}

// =============================================================================
// Tests
// =============================================================================
