//! Router assembly and server lifecycle

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use super::state::AppState;
use super::{handlers, Result, ServerConfig, ServerError};
use crate::model::Predictor;

/// Assemble the route table around shared state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/predict", post(handlers::predict))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

/// Serve the predictor until the process is stopped.
///
/// Owns its own runtime so the CLI stays synchronous. Returns only on
/// bind or accept failure.
pub fn run(config: &ServerConfig, predictor: Arc<dyn Predictor>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config, predictor))
}

async fn serve(config: &ServerConfig, predictor: Arc<dyn Predictor>) -> Result<()> {
    let state = AppState::new(predictor);
    let app = build_router(state);

    let listener = TcpListener::bind(config.address)
        .await
        .map_err(|e| ServerError::Bind(config.address, e))?;

    tracing::info!(address = %config.address, "serving predictions");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IrisFeatures;

    struct ConstantPredictor;

    impl Predictor for ConstantPredictor {
        fn predict(&self, batch: &[IrisFeatures]) -> Vec<usize> {
            vec![0; batch.len()]
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    #[test]
    fn test_build_router_smoke() {
        let state = AppState::new(Arc::new(ConstantPredictor));
        let _router = build_router(state);
    }

    #[test]
    fn test_run_reports_bind_failure() {
        // Occupy a port so the server cannot bind it.
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = occupied.local_addr().unwrap();

        let config = ServerConfig::default().with_address(addr);
        let result = run(&config, Arc::new(ConstantPredictor));

        match result {
            Err(ServerError::Bind(bound, _)) => assert_eq!(bound, addr),
            other => panic!("expected bind error, got {other:?}"),
        }
    }
}
