//! # Verification Codes
//!
//! Issues, checks, and consumes the short-lived one-time codes that prove
//! control of an email address. One pending code per address; issuing a
//! new one supersedes the old. A code is valid for strictly less than
//! [`CODE_TTL_SECS`] seconds and only on exact string match.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::warn;

use crate::store::{PersistentStore, StoreResult, VerificationRecord};

/// Seconds a pending code stays valid after issuance.
pub const CODE_TTL_SECS: i64 = 900;

/// Generate a 6-digit numeric verification code.
///
/// Uniform in [100000, 999999]; zero-padded rendering keeps the contract
/// honest even though the range never produces leading zeros.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("{:06}", n)
}

/// One-time code lifecycle over the persistent code map.
///
/// Every operation reads and rewrites the whole map; there are no partial
/// updates. Expired entries are not garbage-collected - they linger until
/// superseded or consumed, and lookups simply refuse them.
pub struct VerificationService {
    store: Arc<dyn PersistentStore>,
}

impl VerificationService {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// Issue a fresh code for `email`, overwriting any pending one.
    ///
    /// Returns the code so the caller can hand it to the mail transport.
    pub fn issue_code(&self, email: &str) -> StoreResult<String> {
        let code = generate_code();
        let mut codes = self.store.load_codes()?;
        codes.insert(
            email.to_string(),
            VerificationRecord {
                code: code.clone(),
                timestamp: Utc::now().timestamp(),
            },
        );
        self.store.save_codes(&codes)?;
        Ok(code)
    }

    /// True iff a pending code exists for `email`, `submitted` matches it
    /// exactly, and the code is inside its validity window.
    ///
    /// Absence, mismatch, expiry, and store failure all collapse to a
    /// uniform `false` - callers cannot tell which one occurred.
    pub fn check_code(&self, email: &str, submitted: &str) -> bool {
        self.check_code_at(email, submitted, Utc::now().timestamp())
    }

    fn check_code_at(&self, email: &str, submitted: &str, now: i64) -> bool {
        let codes = match self.store.load_codes() {
            Ok(codes) => codes,
            Err(e) => {
                warn!("Code lookup failed: {}", e);
                return false;
            }
        };
        match codes.get(email) {
            Some(record) => record.code == submitted && now - record.timestamp < CODE_TTL_SECS,
            None => false,
        }
    }

    /// Drop the pending code for `email`, if any.
    ///
    /// Invoked after a successful verification so the code cannot be
    /// replayed. Removing an absent record is not an error.
    pub fn consume_code(&self, email: &str) -> StoreResult<()> {
        let mut codes = self.store.load_codes()?;
        codes.remove(email);
        self.store.save_codes(&codes)
    }
}
