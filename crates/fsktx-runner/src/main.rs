//! Binary entry point for the `fsktx` CLI.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use fsktx_runner::{run, Args, RunnerError};

/// Exit code for operational failures (transport, protocol, timeout).
const EXIT_FAILURE: u8 = 1;

/// Exit code for invalid command-line usage.
const EXIT_USAGE: u8 = 2;

/// Conventional exit code after SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!("operation cancelled by user");
        std::process::exit(EXIT_INTERRUPTED);
    }) {
        error!("failed to install interrupt handler: {}", e);
    }

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(RunnerError::Usage(message)) => {
            error!("{}", message);
            ExitCode::from(EXIT_USAGE)
        }
        Err(e) => {
            error!("operation failed: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
