//! # Dispatch Errors

use thiserror::Error;

use crate::feed::FeedError;

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// A dispatch cycle that could not claim success.
///
/// Every variant aborts or fails the current cycle only; the next
/// scheduled cycle starts clean.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Nothing to send to: the list is empty or could not be loaded
    #[error("No subscribers to notify")]
    NoSubscribers,

    /// Feed could not be fetched; no partial send is attempted
    #[error("Feed fetch failed: {0}")]
    Feed(#[from] FeedError),

    /// Deliveries were attempted but none succeeded
    #[error("No deliveries succeeded ({attempted} attempted)")]
    NothingDelivered { attempted: usize },
}
