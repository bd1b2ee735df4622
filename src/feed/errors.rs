//! # Feed Errors

use thiserror::Error;

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Feed fetch errors. All of them abort the current dispatch cycle;
/// none are retried.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport failure: connect, DNS, timeout, or payload decode
    #[error("Feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint answered outside 2xx
    #[error("Feed endpoint returned status {status}")]
    Status { status: u16 },
}
