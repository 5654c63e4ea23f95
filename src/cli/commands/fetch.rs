//! Fetch command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::FetchArgs;
use crate::dataset::DatasetFetcher;

pub fn run_fetch(args: FetchArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, "Fetching raw data...");
    log(level, LogLevel::Verbose, &format!("  Source: {}", args.url));

    let fetcher =
        DatasetFetcher::new().map_err(|e| format!("Failed to build HTTP client: {e}"))?;
    let summary = fetcher
        .fetch(&args.url, &args.output)
        .map_err(|e| format!("Failed to fetch dataset: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Raw data saved to {}", summary.path.display()),
    );
    log(level, LogLevel::Verbose, &format!("  Rows: {}", summary.rows));
    log(
        level,
        LogLevel::Verbose,
        &format!("  SHA-256: {}", summary.digest),
    );
    Ok(())
}
