//! Split TUN namespace checker
//!
//! Creates a TUN device whose socket stays in one network namespace while
//! the interface lives in another, then verifies that split before and
//! after a checkpoint/restore cycle.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod harness;
mod inspect;
mod run;

use cli::{Cli, Commands};

// No async main: the scenario forks, and a multi-threaded runtime must not
// exist at that point.
fn main() -> ExitCode {
    // Parse command-line arguments
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute the command
    let result = match cli.command {
        Commands::Run(args) => {
            run::execute(&args).map(|outcome| harness::report(&outcome).exit_code())
        }
        Commands::Inspect { pid } => inspect::execute(pid).map(|()| ExitCode::SUCCESS),
    };

    // Handle errors
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
