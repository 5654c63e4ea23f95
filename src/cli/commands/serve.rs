//! Serve command implementation

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::ServeArgs;
use crate::registry::ModelStage;
use crate::server::{self, ServerConfig};
use crate::store::Store;

pub fn run_serve(args: ServeArgs, level: LogLevel) -> Result<(), String> {
    let stage = args
        .stage
        .parse::<ModelStage>()
        .map_err(|e| format!("Invalid stage: {e}"))?;

    let store =
        Store::resolve(args.store.as_deref()).map_err(|e| format!("Store error: {e}"))?;

    // A serving process without a model is useless, so a load failure is fatal.
    let model = store
        .load_staged_model(&args.name, stage)
        .map_err(|e| format!("Failed to load model: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Loaded {} ({}) from stage {}",
            args.name,
            model.model_type(),
            stage
        ),
    );

    let address: SocketAddr = args
        .address
        .parse()
        .map_err(|e| format!("Invalid address '{}': {e}", args.address))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    log(
        level,
        LogLevel::Normal,
        &format!("Serving {} on http://{}", args.name, address),
    );

    let config = ServerConfig::default().with_address(address);
    server::run(&config, Arc::new(model)).map_err(|e| format!("Server error: {e}"))
}
