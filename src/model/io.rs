//! Saving and loading trained models as JSON artifacts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::{ModelError, Result, TrainedModel};

/// Artifact layout version. Bumped whenever the serialized shape changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// On-disk envelope around a [`TrainedModel`].
#[derive(Debug, Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    model: TrainedModel,
}

/// Write a trained model to `path` as pretty-printed JSON.
///
/// The parent directory must already exist.
pub fn save_model(model: &TrainedModel, path: impl AsRef<Path>) -> Result<()> {
    let artifact =
        ModelArtifact { format_version: ARTIFACT_FORMAT_VERSION, model: model.clone() };
    let json = serde_json::to_string_pretty(&artifact)?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Read a model artifact back from `path`.
///
/// Rejects unknown format versions and artifacts that fail
/// [`TrainedModel::validate`], so a successfully loaded model is always
/// safe to serve.
pub fn load_model(path: impl AsRef<Path>) -> Result<TrainedModel> {
    let content = std::fs::read_to_string(path)?;
    let artifact: ModelArtifact = serde_json::from_str(&content)?;

    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ModelError::UnsupportedFormatVersion(artifact.format_version));
    }

    artifact.model.validate()?;
    Ok(artifact.model)
}

/// SHA-256 digest of a file, formatted as `sha256:<hex>` for provenance
/// records.
pub fn file_digest(path: impl AsRef<Path>) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IrisFeatures, LogisticRegression, Predictor, RandomForest};
    use tempfile::tempdir;

    fn fitted_model() -> TrainedModel {
        let features = vec![
            IrisFeatures::new(5.0, 3.4, 1.5, 0.2),
            IrisFeatures::new(5.1, 3.5, 1.4, 0.3),
            IrisFeatures::new(6.8, 3.1, 5.8, 2.2),
            IrisFeatures::new(6.9, 3.2, 5.9, 2.1),
        ];
        let labels = vec![0, 0, 1, 1];
        let mut classifier = LogisticRegression::new(100, 0.1);
        classifier.fit(&features, &labels).expect("fit should succeed");
        TrainedModel::LogisticRegression(classifier)
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("model.json");

        let model = fitted_model();
        save_model(&model, &path).expect("save should succeed");
        let loaded = load_model(&path).expect("load should succeed");

        assert_eq!(loaded.model_type(), "logistic_regression");
        let batch = vec![IrisFeatures::new(5.0, 3.4, 1.5, 0.2)];
        assert_eq!(loaded.predict(&batch), model.predict(&batch));
    }

    #[test]
    fn test_round_trip_preserves_forest_predictions() {
        let features = vec![
            IrisFeatures::new(5.0, 3.4, 1.5, 0.2),
            IrisFeatures::new(5.1, 3.5, 1.4, 0.3),
            IrisFeatures::new(6.8, 3.1, 5.8, 2.2),
            IrisFeatures::new(6.9, 3.2, 5.9, 2.1),
        ];
        let labels = vec![0, 0, 2, 2];
        let mut forest = RandomForest::new(10, 5, 42);
        forest.fit(&features, &labels).expect("fit should succeed");
        let model = TrainedModel::RandomForest(forest);

        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("model.json");
        save_model(&model, &path).expect("save should succeed");
        let loaded = load_model(&path).expect("load should succeed");

        assert_eq!(loaded.predict(&features), model.predict(&features));
    }

    #[test]
    fn test_saved_artifact_is_pretty_json_with_version() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("model.json");
        save_model(&fitted_model(), &path).expect("save should succeed");

        let content = std::fs::read_to_string(&path).expect("read should succeed");
        assert!(content.contains('\n'));
        assert!(content.contains("\"format_version\": 1"));
        assert!(content.contains("\"model_type\": \"logistic_regression\""));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let result = load_model(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ModelError::Io(_))));
    }

    #[test]
    fn test_load_invalid_json_is_an_error() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ not json }").expect("write should succeed");

        let result = load_model(&path);
        assert!(matches!(result, Err(ModelError::Json(_))));
    }

    #[test]
    fn test_load_rejects_unknown_format_version() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("model.json");
        save_model(&fitted_model(), &path).expect("save should succeed");

        let content = std::fs::read_to_string(&path).expect("read should succeed");
        let patched = content.replace("\"format_version\": 1", "\"format_version\": 99");
        std::fs::write(&path, patched).expect("write should succeed");

        let result = load_model(&path);
        assert!(matches!(result, Err(ModelError::UnsupportedFormatVersion(99))));
    }

    #[test]
    fn test_load_rejects_unfitted_artifact() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("model.json");
        let artifact = concat!(
            "{\"format_version\": 1, \"model\": {",
            "\"model_type\": \"logistic_regression\",",
            "\"coefficients\": [], \"intercepts\": [],",
            "\"feature_means\": [], \"feature_stds\": [],",
            "\"max_iter\": 200, \"learning_rate\": 0.1}}",
        );
        std::fs::write(&path, artifact).expect("write should succeed");

        let result = load_model(&path);
        assert!(matches!(result, Err(ModelError::NotFitted)));
    }

    #[test]
    fn test_save_into_missing_directory_is_an_error() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("nope").join("model.json");
        assert!(save_model(&fitted_model(), &path).is_err());
    }

    #[test]
    fn test_file_digest_format() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let path = dir.path().join("model.json");
        save_model(&fitted_model(), &path).expect("save should succeed");

        let digest = file_digest(&path).expect("digest should succeed");
        assert!(digest.starts_with("sha256:"));
        assert_eq!(digest.len(), "sha256:".len() + 64);
    }

    #[test]
    fn test_file_digest_tracks_content() {
        let dir = tempdir().expect("temp dir creation should succeed");
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "same").expect("write should succeed");
        std::fs::write(&b, "same").expect("write should succeed");

        let digest_a = file_digest(&a).expect("digest should succeed");
        let digest_b = file_digest(&b).expect("digest should succeed");
        assert_eq!(digest_a, digest_b);

        std::fs::write(&b, "different").expect("write should succeed");
        let digest_b = file_digest(&b).expect("digest should succeed");
        assert_ne!(digest_a, digest_b);
    }
}
