//! Register command implementation

use std::collections::HashMap;

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::RegisterArgs;
use crate::registry::{ModelRegistry, ModelStage, ModelUri};
use crate::store::Store;

pub fn run_register(args: RegisterArgs, level: LogLevel) -> Result<(), String> {
    let store =
        Store::resolve(args.store.as_deref()).map_err(|e| format!("Store error: {e}"))?;
    let tracker = store.tracker(&args.experiment);

    let best = tracker
        .find_best_run(&args.metric)
        .map_err(|e| format!("Failed to search runs: {e}"))?;
    let Some(run) = best else {
        println!("No runs found.");
        return Ok(());
    };

    let Some(score) = run.latest_metric(&args.metric) else {
        return Err(format!("Run {} has no '{}' metric", run.run_id, args.metric));
    };

    log(
        level,
        LogLevel::Normal,
        &format!("Best run: {} ({} = {:.4})", run.run_id, args.metric, score),
    );

    let source_uri = ModelUri::for_run(&run.run_id).to_string();
    let mut registry = store.registry();
    let version = registry
        .register_model(
            &args.name,
            &source_uri,
            &run.run_id,
            Some(&format!(
                "Best '{}' run of experiment '{}'",
                args.metric, args.experiment
            )),
        )
        .map_err(|e| format!("Failed to register model: {e}"))?;
    registry
        .log_metrics(
            &args.name,
            version.version,
            HashMap::from([(args.metric.clone(), score)]),
        )
        .map_err(|e| format!("Failed to record metric: {e}"))?;
    registry
        .transition_stage(&args.name, version.version, ModelStage::Staging)
        .map_err(|e| format!("Failed to stage model: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Registered {} version {} to Staging",
            args.name, version.version
        ),
    );
    Ok(())
}
