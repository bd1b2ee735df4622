//! # Persistent Store
//!
//! Flat-file persistence for the two durable resources: the
//! newline-delimited subscriber list and the keyed JSON map of pending
//! verification codes. Reads tolerate a missing resource by returning an
//! empty collection; writes fully overwrite the resource. Concurrent
//! read-modify-write sequences are last-writer-wins.

pub mod errors;

pub use errors::{StoreError, StoreResult};

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// File name of the newline-delimited subscriber list.
pub const SUBSCRIBERS_FILE: &str = "registered_emails.txt";

/// File name of the pending verification code map.
pub const CODES_FILE: &str = "verification_codes.json";

/// A pending verification code for one email address.
///
/// On-disk shape: `{ "code": "123456", "timestamp": 1722945600 }` where
/// `timestamp` is the Unix second of issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// 6-digit numeric code, zero-padded
    pub code: String,
    /// Unix timestamp (seconds) of issuance
    pub timestamp: i64,
}

/// Storage abstraction over the two flat resources.
///
/// An `Err` from any method means the operation did not take effect;
/// callers decide whether that is worth surfacing or folding into a
/// negative answer.
pub trait PersistentStore: Send + Sync {
    /// Load the subscriber list in insertion order. Absent resource is an
    /// empty list, never an error.
    fn load_subscribers(&self) -> StoreResult<Vec<String>>;

    /// Overwrite the subscriber list. An empty list truncates the resource
    /// to empty content.
    fn save_subscribers(&self, subscribers: &[String]) -> StoreResult<()>;

    /// Load the pending code map. Absent resource is an empty map.
    fn load_codes(&self) -> StoreResult<HashMap<String, VerificationRecord>>;

    /// Overwrite the pending code map.
    fn save_codes(&self, codes: &HashMap<String, VerificationRecord>) -> StoreResult<()>;
}

/// Flat-file store rooted at a data directory.
///
/// Individual writes hold an exclusive lock so a single rewrite is never
/// interleaved; two whole operations racing still resolve last-writer-wins.
pub struct FileStore {
    subscribers_path: PathBuf,
    codes_path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    /// Open a store over an existing data directory.
    ///
    /// Does not create anything; resource files absent at read time are
    /// treated as empty. Use [`FileStore::init`] for the one-time setup.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            subscribers_path: data_dir.join(SUBSCRIBERS_FILE),
            codes_path: data_dir.join(CODES_FILE),
            lock: RwLock::new(()),
        }
    }

    /// Create the data directory and empty resource files if absent, then
    /// open the store.
    ///
    /// This is the explicit initialization step invoked once at startup;
    /// loading never creates files as a side effect.
    pub fn init(data_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(data_dir).map_err(|e| StoreError::write_failed(data_dir, e))?;

        let store = Self::new(data_dir);
        if !store.subscribers_path.exists() {
            fs::write(&store.subscribers_path, "")
                .map_err(|e| StoreError::write_failed(&store.subscribers_path, e))?;
        }
        if !store.codes_path.exists() {
            fs::write(&store.codes_path, "{}")
                .map_err(|e| StoreError::write_failed(&store.codes_path, e))?;
        }
        Ok(store)
    }

    /// Path of the subscriber list file.
    pub fn subscribers_path(&self) -> &Path {
        &self.subscribers_path
    }

    /// Path of the code map file.
    pub fn codes_path(&self) -> &Path {
        &self.codes_path
    }

    fn read_resource(&self, path: &Path) -> StoreResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::read_failed(path, e)),
        }
    }
}

impl PersistentStore for FileStore {
    fn load_subscribers(&self) -> StoreResult<Vec<String>> {
        let _guard = self.lock.read().map_err(|_| StoreError::LockPoisoned)?;
        let content = match self.read_resource(&self.subscribers_path)? {
            Some(content) => content,
            None => return Ok(Vec::new()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(content.trim().lines().map(str::to_string).collect())
    }

    fn save_subscribers(&self, subscribers: &[String]) -> StoreResult<()> {
        let _guard = self.lock.write().map_err(|_| StoreError::LockPoisoned)?;
        let content = if subscribers.is_empty() {
            String::new()
        } else {
            format!("{}\n", subscribers.join("\n"))
        };
        fs::write(&self.subscribers_path, content)
            .map_err(|e| StoreError::write_failed(&self.subscribers_path, e))
    }

    fn load_codes(&self) -> StoreResult<HashMap<String, VerificationRecord>> {
        let _guard = self.lock.read().map_err(|_| StoreError::LockPoisoned)?;
        let content = match self.read_resource(&self.codes_path)? {
            Some(content) => content,
            None => return Ok(HashMap::new()),
        };
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        // A map that does not decode is treated as empty rather than
        // blocking every verification until someone repairs the file.
        match serde_json::from_str(&content) {
            Ok(codes) => Ok(codes),
            Err(e) => {
                warn!(
                    "Discarding undecodable code map {}: {}",
                    self.codes_path.display(),
                    e
                );
                Ok(HashMap::new())
            }
        }
    }

    fn save_codes(&self, codes: &HashMap<String, VerificationRecord>) -> StoreResult<()> {
        let _guard = self.lock.write().map_err(|_| StoreError::LockPoisoned)?;
        let content = serde_json::to_string_pretty(codes)?;
        fs::write(&self.codes_path, content)
            .map_err(|e| StoreError::write_failed(&self.codes_path, e))
    }
}

/// In-memory store for testing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    subscribers: RwLock<Vec<String>>,
    codes: RwLock<HashMap<String, VerificationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn load_subscribers(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .subscribers
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone())
    }

    fn save_subscribers(&self, subscribers: &[String]) -> StoreResult<()> {
        *self
            .subscribers
            .write()
            .map_err(|_| StoreError::LockPoisoned)? = subscribers.to_vec();
        Ok(())
    }

    fn load_codes(&self) -> StoreResult<HashMap<String, VerificationRecord>> {
        Ok(self
            .codes
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone())
    }

    fn save_codes(&self, codes: &HashMap<String, VerificationRecord>) -> StoreResult<()> {
        *self.codes.write().map_err(|_| StoreError::LockPoisoned)? = codes.clone();
        Ok(())
    }
}
