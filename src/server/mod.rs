//! HTTP serving API for the registered classifier.
//!
//! Serves the staged model over three routes: a welcome banner at `/`,
//! single-sample classification at `POST /predict`, and Prometheus metrics
//! at `/metrics`. The model is loaded once before the listener binds; a
//! serving process never hot-swaps what it serves.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cultivar::model::{LogisticRegression, TrainedModel};
//! use cultivar::server::{self, ServerConfig};
//!
//! # fn main() -> cultivar::server::Result<()> {
//! let model = TrainedModel::LogisticRegression(LogisticRegression::new(200, 0.1));
//! let config = ServerConfig::default();
//! server::run(&config, Arc::new(model))?;
//! # Ok(())
//! # }
//! ```

mod api;
mod handlers;
mod state;

pub use api::{build_router, run};
pub use handlers::{metrics, predict, root};
pub use state::AppState;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

use crate::model::IrisFeatures;

/// Body of the `GET /` welcome banner
pub const WELCOME_MESSAGE: &str = "Welcome to the Iris Classifier API!";

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {0}: {1}")]
    Bind(SocketAddr, #[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the listener binds
    pub address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: crate::config::DEFAULT_BIND_ADDR.parse().unwrap(),
        }
    }
}

impl ServerConfig {
    /// Create config with custom address
    pub fn with_address(mut self, addr: SocketAddr) -> Self {
        self.address = addr;
        self
    }
}

// =============================================================================
// Request/Response DTOs
// =============================================================================

/// Welcome banner response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeResponse {
    /// Greeting line
    pub message: String,
}

/// One iris sample to classify
///
/// All four measurements are required; a request missing any of them is
/// rejected at deserialization and never reaches the model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Sepal length in cm
    pub sepal_length: f64,
    /// Sepal width in cm
    pub sepal_width: f64,
    /// Petal length in cm
    pub petal_length: f64,
    /// Petal width in cm
    pub petal_width: f64,
}

impl PredictRequest {
    /// Convert the wire shape into the model's feature type
    #[must_use]
    pub fn features(&self) -> IrisFeatures {
        IrisFeatures::new(
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        )
    }
}

/// Classification result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Predicted class label: 0 setosa, 1 versicolor, 2 virginica
    pub predicted_species: usize,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.address.port(), 8000);
        assert!(config.address.ip().is_loopback());
    }

    #[test]
    fn test_server_config_with_address() {
        let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        let config = ServerConfig::default().with_address(addr);
        assert_eq!(config.address.port(), 8080);
    }

    #[test]
    fn test_welcome_message_text() {
        assert_eq!(WELCOME_MESSAGE, "Welcome to the Iris Classifier API!");
    }

    #[test]
    fn test_predict_request_parses_full_payload() {
        let json = r#"{
            "sepal_length": 5.1,
            "sepal_width": 3.5,
            "petal_length": 1.4,
            "petal_width": 0.2
        }"#;
        let req: PredictRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.features().as_array(), [5.1, 3.5, 1.4, 0.2]);
    }

    #[test]
    fn test_predict_request_rejects_missing_field() {
        let json = r#"{"sepal_length": 5.1, "sepal_width": 3.5, "petal_length": 1.4}"#;
        assert!(serde_json::from_str::<PredictRequest>(json).is_err());
    }

    #[test]
    fn test_predict_request_rejects_mistyped_field() {
        let json = r#"{
            "sepal_length": "long",
            "sepal_width": 3.5,
            "petal_length": 1.4,
            "petal_width": 0.2
        }"#;
        assert!(serde_json::from_str::<PredictRequest>(json).is_err());
    }

    #[test]
    fn test_predict_request_ignores_unknown_fields() {
        let json = r#"{
            "sepal_length": 5.1,
            "sepal_width": 3.5,
            "petal_length": 1.4,
            "petal_width": 0.2,
            "color": "purple"
        }"#;
        assert!(serde_json::from_str::<PredictRequest>(json).is_ok());
    }

    #[test]
    fn test_predict_response_field_name() {
        let json = serde_json::to_string(&PredictResponse { predicted_species: 2 }).unwrap();
        assert_eq!(json, r#"{"predicted_species":2}"#);
    }

    #[test]
    fn test_welcome_response_serialize() {
        let json = serde_json::to_string(&WelcomeResponse {
            message: WELCOME_MESSAGE.to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"message":"Welcome to the Iris Classifier API!"}"#);
    }
}

// =============================================================================
// Property Tests
// =============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_server_config_port_preserved(port in 1024u16..65535) {
            let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();
            let config = ServerConfig::default().with_address(addr);
            prop_assert_eq!(config.address.port(), port);
        }

        #[test]
        fn prop_predict_request_roundtrip(
            sepal_length in 0.0f64..10.0,
            sepal_width in 0.0f64..10.0,
            petal_length in 0.0f64..10.0,
            petal_width in 0.0f64..10.0
        ) {
            let req = PredictRequest { sepal_length, sepal_width, petal_length, petal_width };
            let json = serde_json::to_string(&req).unwrap();
            let parsed: PredictRequest = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(parsed.features().as_array(), req.features().as_array());
        }

        #[test]
        fn prop_predict_response_roundtrip(label in 0usize..3) {
            let json = serde_json::to_string(&PredictResponse { predicted_species: label }).unwrap();
            let parsed: PredictResponse = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(parsed.predicted_species, label);
        }
    }
}
