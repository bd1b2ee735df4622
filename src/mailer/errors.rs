//! # Mail Errors

use thiserror::Error;

/// Result type for mail operations
pub type MailResult<T> = Result<T, MailError>;

/// Mail transport errors
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// Sender or recipient mailbox did not parse
    #[error("Invalid mailbox address: {0}")]
    InvalidAddress(String),

    /// Message could not be assembled
    #[error("Failed to build message: {0}")]
    BuildFailed(String),

    /// Transport-level delivery failure
    #[error("Delivery failed: {0}")]
    Transport(String),
}
