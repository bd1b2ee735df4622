//! CLI module for mailfeed
//!
//! Provides the command-line interface:
//! - init: create the data directory and empty resource files
//! - subscribe / confirm: verification-code subscription flow
//! - unsubscribe / confirm-unsubscribe: verification-code removal flow
//! - dispatch: one scheduled digest broadcast (the cron entry point)

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{
    confirm, confirm_unsubscribe, dispatch, init, run_command, subscribe, unsubscribe,
    CRON_LOG_FILE,
};
pub use errors::{CliError, CliResult};

use tracing_subscriber::EnvFilter;

/// Parse arguments and run the selected command.
pub fn run() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse_args();
    run_command(cli.command)
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mailfeed=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
