//! CLI-specific error types
//!
//! Everything here ends the invocation with a non-zero exit; the message
//! is what the operator (or the invoking scheduler) sees on stderr.

use thiserror::Error;

use crate::config::ConfigError;
use crate::dispatch::DispatchError;
use crate::mailer::MailError;
use crate::store::StoreError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Address failed the syntactic check
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("{0} is already subscribed")]
    AlreadySubscribed(String),

    #[error("{0} is not subscribed")]
    NotSubscribed(String),

    /// Uniform rejection: absent, mismatched, or expired code
    #[error("Verification failed")]
    CodeRejected,

    /// Cron log or other local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
