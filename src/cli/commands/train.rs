//! Train command implementation

use std::collections::HashMap;
use std::fs;

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::TrainArgs;
use crate::dataset::{features_and_targets, read_csv};
use crate::model::{
    accuracy, save_model, train_test_split, LogisticRegression, Predictor, RandomForest,
    TrainedModel,
};
use crate::store::Store;
use crate::tracking::RunStatus;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Training on {}", args.data.display()),
    );

    let records = read_csv(&args.data).map_err(|e| format!("Failed to read dataset: {e}"))?;
    let (features, targets) = features_and_targets(&records);
    let (train_x, test_x, train_y, test_y) =
        train_test_split(&features, &targets, args.test_size, args.seed)
            .map_err(|e| format!("Failed to split dataset: {e}"))?;

    log(
        level,
        LogLevel::Verbose,
        &format!("  Samples: {} train / {} test", train_x.len(), test_x.len()),
    );

    let store =
        Store::resolve(args.store.as_deref()).map_err(|e| format!("Store error: {e}"))?;
    let mut tracker = store.tracker(&args.experiment);

    // Both model families train on the same split so their accuracies are
    // directly comparable when the registrar picks the best run.
    let candidates: Vec<(&str, HashMap<String, String>, TrainedModel)> = vec![
        (
            "logistic-regression",
            HashMap::from([
                ("model_type".to_string(), "logistic_regression".to_string()),
                ("max_iter".to_string(), args.max_iter.to_string()),
                ("learning_rate".to_string(), args.learning_rate.to_string()),
                ("test_size".to_string(), args.test_size.to_string()),
                ("seed".to_string(), args.seed.to_string()),
            ]),
            TrainedModel::LogisticRegression(LogisticRegression::new(
                args.max_iter,
                args.learning_rate,
            )),
        ),
        (
            "random-forest",
            HashMap::from([
                ("model_type".to_string(), "random_forest".to_string()),
                ("n_estimators".to_string(), args.n_estimators.to_string()),
                ("max_depth".to_string(), args.max_depth.to_string()),
                ("random_state".to_string(), args.seed.to_string()),
                ("test_size".to_string(), args.test_size.to_string()),
                ("seed".to_string(), args.seed.to_string()),
            ]),
            TrainedModel::RandomForest(RandomForest::new(
                args.n_estimators,
                args.max_depth,
                args.seed,
            )),
        ),
    ];

    for (run_name, params, mut model) in candidates {
        let run_id = tracker
            .start_run(Some(run_name))
            .map_err(|e| format!("Failed to start run: {e}"))?;
        tracker
            .log_params(&run_id, &params)
            .map_err(|e| format!("Failed to log params: {e}"))?;

        model
            .fit(&train_x, &train_y)
            .map_err(|e| format!("Failed to fit {run_name}: {e}"))?;

        let predicted = model.predict(&test_x);
        let score = accuracy(&predicted, &test_y)
            .map_err(|e| format!("Failed to score {run_name}: {e}"))?;
        tracker
            .log_metric(&run_id, "accuracy", score, 0)
            .map_err(|e| format!("Failed to log metric: {e}"))?;

        let artifact = store.artifact_path(&run_id);
        if let Some(parent) = artifact.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create artifact dir: {e}"))?;
        }
        save_model(&model, &artifact).map_err(|e| format!("Failed to save model: {e}"))?;
        tracker
            .log_artifact(&run_id, &artifact.display().to_string())
            .map_err(|e| format!("Failed to log artifact: {e}"))?;

        tracker
            .end_run(&run_id, RunStatus::Completed)
            .map_err(|e| format!("Failed to end run: {e}"))?;

        log(
            level,
            LogLevel::Normal,
            &format!("{run_name}: accuracy {score:.4} (run {run_id})"),
        );
    }

    log(level, LogLevel::Normal, "Training complete!");
    Ok(())
}
