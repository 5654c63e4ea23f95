//! CLI command implementations

mod fetch;
mod register;
mod serve;
mod train;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    // Configure output based on verbose/quiet flags
    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    match cli.command {
        Command::Fetch(args) => fetch::run_fetch(args, log_level),
        Command::Train(args) => train::run_train(args, log_level),
        Command::Register(args) => register::run_register(args, log_level),
        Command::Serve(args) => serve::run_serve(args, log_level),
    }
}
