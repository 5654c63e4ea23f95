//! File-backed project store, the stand-in for an external tracking server.
//!
//! Every pipeline stage runs as its own process; the store directory is the
//! only thing they share. Layout under the root:
//!
//! ```text
//! runs/<run_id>.json             experiment runs
//! artifacts/<run_id>/model.json  model artifacts
//! registry/<name>.json           registered model versions
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config;
use crate::model::{load_model, ModelError, TrainedModel};
use crate::registry::{FileRegistry, ModelRegistry, ModelStage, ModelUri, RegistryError};
use crate::tracking::storage::JsonFileBackend;
use crate::tracking::ExperimentTracker;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unsupported store scheme '{0}': use file:// or a plain path")]
    UnsupportedScheme(String),

    #[error("store URI '{0}' has an empty path")]
    EmptyPath(String),

    #[error("no '{name}' version in stage {stage}")]
    NoStagedVersion { name: String, stage: ModelStage },

    #[error("version source '{0}' is not a runs:/ URI")]
    NotARunUri(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle to a store root. Cheap to clone; directories are created lazily
/// by the tracker and registry on first write.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open a store from a URI: `file://<path>` or a plain path.
    ///
    /// Any other scheme is rejected by name; this store never talks to a
    /// remote service.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let path = if let Some(path) = uri.strip_prefix("file://") {
            path
        } else if let Some((scheme, _)) = uri.split_once("://") {
            return Err(StoreError::UnsupportedScheme(scheme.to_string()));
        } else {
            uri
        };

        if path.trim().is_empty() {
            return Err(StoreError::EmptyPath(uri.to_string()));
        }
        Ok(Self { root: PathBuf::from(path) })
    }

    /// Resolve the store location: explicit flag value first, then the
    /// `CULTIVAR_TRACKING_URI` environment variable, then the default
    /// `./cultivar-store`.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(uri) => Self::from_uri(uri),
            None => match std::env::var(config::TRACKING_URI_ENV) {
                Ok(uri) => Self::from_uri(&uri),
                Err(_) => Self::from_uri(config::DEFAULT_STORE_URI),
            },
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.root.join("runs")
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join("artifacts")
    }

    pub fn registry_dir(&self) -> PathBuf {
        self.root.join("registry")
    }

    /// Where the model artifact of a run lives.
    pub fn artifact_path(&self, run_id: &str) -> PathBuf {
        self.artifacts_dir().join(run_id).join("model.json")
    }

    /// Open the experiment tracker rooted in this store.
    pub fn tracker(&self, experiment: &str) -> ExperimentTracker<JsonFileBackend> {
        ExperimentTracker::new(experiment, JsonFileBackend::new(self.runs_dir()))
    }

    /// Open the model registry rooted in this store.
    pub fn registry(&self) -> FileRegistry {
        FileRegistry::new(self.registry_dir())
    }

    /// Load the newest model registered under `name` in `stage`.
    ///
    /// This is the whole contract between the serving process and the rest
    /// of the pipeline: look the version up in the registry, resolve its
    /// `runs:/` source URI to an artifact path, load and validate the
    /// artifact.
    pub fn load_staged_model(&self, name: &str, stage: ModelStage) -> Result<TrainedModel> {
        let registry = self.registry();
        let version = registry
            .get_latest_by_stage(name, stage)
            .ok_or_else(|| StoreError::NoStagedVersion { name: name.to_string(), stage })?;

        let run_id = match ModelUri::parse(&version.source_uri)? {
            ModelUri::Runs { run_id } => run_id,
            ModelUri::Models { .. } => {
                return Err(StoreError::NotARunUri(version.source_uri.clone()))
            }
        };

        Ok(load_model(self.artifact_path(&run_id))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{save_model, IrisFeatures, LogisticRegression, Predictor};
    use tempfile::tempdir;

    fn fitted_model() -> TrainedModel {
        let features = vec![
            IrisFeatures::new(5.0, 3.4, 1.5, 0.2),
            IrisFeatures::new(6.8, 3.1, 5.8, 2.2),
        ];
        let labels = vec![0, 1];
        let mut classifier = LogisticRegression::new(100, 0.1);
        classifier.fit(&features, &labels).expect("fit should succeed");
        TrainedModel::LogisticRegression(classifier)
    }

    /// Register a model artifact the way the train + register commands do.
    fn stage_a_model(store: &Store, name: &str, run_id: &str) -> TrainedModel {
        let model = fitted_model();

        let artifact_path = store.artifact_path(run_id);
        std::fs::create_dir_all(artifact_path.parent().expect("artifact path has a parent"))
            .expect("artifact dir creation should succeed");
        save_model(&model, &artifact_path).expect("save should succeed");

        let mut registry = store.registry();
        let source_uri = ModelUri::for_run(run_id).to_string();
        let version = registry
            .register_model(name, &source_uri, run_id, None)
            .expect("register should succeed");
        registry
            .transition_stage(name, version.version, ModelStage::Staging)
            .expect("transition should succeed");

        model
    }

    #[test]
    fn test_from_uri_accepts_plain_path() {
        let store = Store::from_uri("./some/dir").expect("plain path should be accepted");
        assert_eq!(store.root(), Path::new("./some/dir"));
    }

    #[test]
    fn test_from_uri_accepts_file_scheme() {
        let store = Store::from_uri("file:///tmp/store").expect("file:// should be accepted");
        assert_eq!(store.root(), Path::new("/tmp/store"));
    }

    #[test]
    fn test_from_uri_rejects_http_scheme() {
        match Store::from_uri("http://127.0.0.1:5000") {
            Err(StoreError::UnsupportedScheme(scheme)) => assert_eq!(scheme, "http"),
            other => panic!("expected UnsupportedScheme, got {other:?}"),
        }
        assert!(matches!(
            Store::from_uri("https://tracking.example.com"),
            Err(StoreError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_from_uri_rejects_empty_paths() {
        assert!(matches!(Store::from_uri(""), Err(StoreError::EmptyPath(_))));
        assert!(matches!(Store::from_uri("file://"), Err(StoreError::EmptyPath(_))));
    }

    #[test]
    fn test_resolve_prefers_explicit_uri() {
        let store = Store::resolve(Some("/explicit/root")).expect("resolve should succeed");
        assert_eq!(store.root(), Path::new("/explicit/root"));
    }

    #[test]
    fn test_resolve_reads_env_when_no_explicit_uri() {
        // The only test that touches the variable; every other resolve call
        // in the suite passes an explicit URI.
        std::env::set_var(config::TRACKING_URI_ENV, "file:///from/env");
        let resolved = Store::resolve(None);
        std::env::remove_var(config::TRACKING_URI_ENV);
        assert_eq!(resolved.expect("resolve should succeed").root(), Path::new("/from/env"));
    }

    #[test]
    fn test_layout_directories_hang_off_the_root() {
        let store = Store::from_uri("/srv/store").expect("resolve should succeed");
        assert_eq!(store.runs_dir(), Path::new("/srv/store/runs"));
        assert_eq!(store.artifacts_dir(), Path::new("/srv/store/artifacts"));
        assert_eq!(store.registry_dir(), Path::new("/srv/store/registry"));
        assert_eq!(
            store.artifact_path("run-1234"),
            Path::new("/srv/store/artifacts/run-1234/model.json")
        );
    }

    #[test]
    fn test_tracker_writes_under_runs_dir() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let store =
            Store::from_uri(dir.path().to_str().expect("utf-8 path")).expect("store should open");

        let mut tracker = store.tracker("iris");
        let run_id = tracker.start_run(None).expect("start should succeed");
        tracker
            .end_run(&run_id, crate::tracking::RunStatus::Completed)
            .expect("end should succeed");
        assert!(store.runs_dir().join(format!("{run_id}.json")).exists());
    }

    #[test]
    fn test_load_staged_model_round_trip() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let store =
            Store::from_uri(dir.path().to_str().expect("utf-8 path")).expect("store should open");

        let expected = stage_a_model(&store, "IrisClassifier", "run-0000000000000001");

        let loaded = store
            .load_staged_model("IrisClassifier", ModelStage::Staging)
            .expect("load should succeed");

        let batch = vec![IrisFeatures::new(5.0, 3.4, 1.5, 0.2)];
        assert_eq!(loaded.predict(&batch), expected.predict(&batch));
    }

    #[test]
    fn test_load_staged_model_without_any_version_is_an_error() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let store =
            Store::from_uri(dir.path().to_str().expect("utf-8 path")).expect("store should open");

        let result = store.load_staged_model("IrisClassifier", ModelStage::Staging);
        match result {
            Err(StoreError::NoStagedVersion { name, stage }) => {
                assert_eq!(name, "IrisClassifier");
                assert_eq!(stage, ModelStage::Staging);
            }
            other => panic!("expected NoStagedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_load_staged_model_ignores_versions_in_other_stages() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let store =
            Store::from_uri(dir.path().to_str().expect("utf-8 path")).expect("store should open");

        stage_a_model(&store, "IrisClassifier", "run-0000000000000001");

        let result = store.load_staged_model("IrisClassifier", ModelStage::Production);
        assert!(matches!(result, Err(StoreError::NoStagedVersion { .. })));
    }

    #[test]
    fn test_load_staged_model_with_missing_artifact_is_an_error() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let store =
            Store::from_uri(dir.path().to_str().expect("utf-8 path")).expect("store should open");

        // Registered but never saved: the registry row points at nothing.
        let mut registry = store.registry();
        let version = registry
            .register_model("IrisClassifier", "runs:/run-77/model", "run-77", None)
            .expect("register should succeed");
        registry
            .transition_stage("IrisClassifier", version.version, ModelStage::Staging)
            .expect("transition should succeed");

        let result = store.load_staged_model("IrisClassifier", ModelStage::Staging);
        assert!(matches!(result, Err(StoreError::Model(ModelError::Io(_)))));
    }

    #[test]
    fn test_load_staged_model_with_malformed_source_uri_is_an_error() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let store =
            Store::from_uri(dir.path().to_str().expect("utf-8 path")).expect("store should open");

        let mut registry = store.registry();
        let version = registry
            .register_model("IrisClassifier", "s3://bucket/model", "run-88", None)
            .expect("register should succeed");
        registry
            .transition_stage("IrisClassifier", version.version, ModelStage::Staging)
            .expect("transition should succeed");

        let result = store.load_staged_model("IrisClassifier", ModelStage::Staging);
        assert!(matches!(result, Err(StoreError::Registry(RegistryError::InvalidUri(_)))));
    }

    #[test]
    fn test_newest_staged_version_wins() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let store =
            Store::from_uri(dir.path().to_str().expect("utf-8 path")).expect("store should open");

        stage_a_model(&store, "IrisClassifier", "run-0000000000000001");

        // A second staged registration supersedes the first.
        let features = vec![
            IrisFeatures::new(5.0, 3.4, 1.5, 0.2),
            IrisFeatures::new(6.0, 2.8, 4.5, 1.4),
            IrisFeatures::new(6.8, 3.1, 5.8, 2.2),
        ];
        let labels = vec![0, 1, 2];
        let mut classifier = LogisticRegression::new(150, 0.1);
        classifier.fit(&features, &labels).expect("fit should succeed");
        let second = TrainedModel::LogisticRegression(classifier);

        let run_id = "run-0000000000000002";
        let artifact_path = store.artifact_path(run_id);
        std::fs::create_dir_all(artifact_path.parent().expect("artifact path has a parent"))
            .expect("artifact dir creation should succeed");
        save_model(&second, &artifact_path).expect("save should succeed");

        let mut registry = store.registry();
        let version = registry
            .register_model(
                "IrisClassifier",
                &ModelUri::for_run(run_id).to_string(),
                run_id,
                None,
            )
            .expect("register should succeed");
        assert_eq!(version.version, 2);
        registry
            .transition_stage("IrisClassifier", version.version, ModelStage::Staging)
            .expect("transition should succeed");

        let loaded = store
            .load_staged_model("IrisClassifier", ModelStage::Staging)
            .expect("load should succeed");
        assert_eq!(loaded.predict(&features), second.predict(&features));
    }
}
