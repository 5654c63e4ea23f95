//! Model URI parsing
//!
//! The registry hands out two URI shapes: `runs:/<run_id>/model` points at
//! the artifact a tracking run logged, and `models:/<name>/<stage>` points at
//! whatever version currently holds a stage. Anything else is rejected.

use super::{ModelStage, RegistryError, Result};

/// A parsed model URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelUri {
    /// `runs:/<run_id>/model` -- the artifact logged by a tracking run
    Runs { run_id: String },
    /// `models:/<name>/<stage>` -- the latest version at a stage
    Models { name: String, stage: ModelStage },
}

impl ModelUri {
    /// URI for the model artifact of a tracking run
    #[must_use]
    pub fn for_run(run_id: &str) -> Self {
        ModelUri::Runs {
            run_id: run_id.to_string(),
        }
    }

    /// URI for the latest version of a model at a stage
    #[must_use]
    pub fn for_stage(name: &str, stage: ModelStage) -> Self {
        ModelUri::Models {
            name: name.to_string(),
            stage,
        }
    }

    /// Parse a model URI string
    pub fn parse(uri: &str) -> Result<Self> {
        if let Some(rest) = uri.strip_prefix("runs:/") {
            let (run_id, artifact) = rest
                .split_once('/')
                .ok_or_else(|| RegistryError::InvalidUri(uri.to_string()))?;
            if run_id.is_empty() || artifact != "model" {
                return Err(RegistryError::InvalidUri(uri.to_string()));
            }
            return Ok(ModelUri::Runs {
                run_id: run_id.to_string(),
            });
        }

        if let Some(rest) = uri.strip_prefix("models:/") {
            let (name, stage) = rest
                .split_once('/')
                .ok_or_else(|| RegistryError::InvalidUri(uri.to_string()))?;
            if name.is_empty() {
                return Err(RegistryError::InvalidUri(uri.to_string()));
            }
            return Ok(ModelUri::Models {
                name: name.to_string(),
                stage: stage.parse()?,
            });
        }

        Err(RegistryError::InvalidUri(uri.to_string()))
    }
}

impl std::fmt::Display for ModelUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelUri::Runs { run_id } => write!(f, "runs:/{run_id}/model"),
            ModelUri::Models { name, stage } => write!(f, "models:/{name}/{stage}"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_runs_uri_roundtrip(run_id in "[a-z0-9][a-z0-9-]{0,24}") {
            let uri = ModelUri::for_run(&run_id);
            let parsed = ModelUri::parse(&uri.to_string()).unwrap();
            prop_assert_eq!(parsed, uri);
        }

        #[test]
        fn prop_models_uri_roundtrip(
            name in "[A-Za-z][A-Za-z0-9_-]{0,15}",
            stage_sel in any::<u8>()
        ) {
            let stage = match stage_sel % 4 {
                0 => ModelStage::None,
                1 => ModelStage::Staging,
                2 => ModelStage::Production,
                _ => ModelStage::Archived,
            };
            let uri = ModelUri::for_stage(&name, stage);
            let parsed = ModelUri::parse(&uri.to_string()).unwrap();
            prop_assert_eq!(parsed, uri);
        }
    }
}
