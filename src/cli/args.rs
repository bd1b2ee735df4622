//! CLI argument definitions using clap
//!
//! Commands:
//! - mailfeed init --config <path>
//! - mailfeed subscribe --config <path> --email <addr>
//! - mailfeed confirm --config <path> --email <addr> --code <code>
//! - mailfeed unsubscribe --config <path> --email <addr>
//! - mailfeed confirm-unsubscribe --config <path> --email <addr> --code <code>
//! - mailfeed dispatch --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mailfeed - periodic email digests of public GitHub activity
#[derive(Parser, Debug)]
#[command(name = "mailfeed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and empty resource files
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./mailfeed.json")]
        config: PathBuf,
    },

    /// Start a subscription: emails a verification code
    Subscribe {
        /// Path to configuration file
        #[arg(long, default_value = "./mailfeed.json")]
        config: PathBuf,

        /// Address to subscribe
        #[arg(long)]
        email: String,
    },

    /// Confirm a subscription with the emailed code
    Confirm {
        /// Path to configuration file
        #[arg(long, default_value = "./mailfeed.json")]
        config: PathBuf,

        /// Address the code was sent to
        #[arg(long)]
        email: String,

        /// 6-digit code from the verification email
        #[arg(long)]
        code: String,
    },

    /// Start removal: emails an unsubscribe confirmation code
    Unsubscribe {
        /// Path to configuration file
        #[arg(long, default_value = "./mailfeed.json")]
        config: PathBuf,

        /// Address to remove
        #[arg(long)]
        email: String,
    },

    /// Confirm removal with the emailed code
    ConfirmUnsubscribe {
        /// Path to configuration file
        #[arg(long, default_value = "./mailfeed.json")]
        config: PathBuf,

        /// Address the code was sent to
        #[arg(long)]
        email: String,

        /// 6-digit code from the confirmation email
        #[arg(long)]
        code: String,
    },

    /// Run one dispatch cycle (invoked by cron roughly every 5 minutes)
    Dispatch {
        /// Path to configuration file
        #[arg(long, default_value = "./mailfeed.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
