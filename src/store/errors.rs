//! # Store Errors
//!
//! Error types for the flat-file persistence layer. A store error always
//! means "the operation did not take effect" - nothing here is fatal to
//! the process.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Resource could not be read
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Resource could not be written
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Code map could not be serialized
    #[error("Failed to encode code map: {0}")]
    Encode(#[from] serde_json::Error),

    /// Write-discipline lock was poisoned by a panicking holder
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Read failure at `path`
    pub fn read_failed(path: &Path, source: io::Error) -> Self {
        Self::ReadFailed {
            path: path.display().to_string(),
            source,
        }
    }

    /// Write failure at `path`
    pub fn write_failed(path: &Path, source: io::Error) -> Self {
        Self::WriteFailed {
            path: path.display().to_string(),
            source,
        }
    }
}
