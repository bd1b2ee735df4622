//! # Subscription Registry
//!
//! Add, remove, and query subscriber addresses over the persistent list.
//! Addresses are trim-normalized before every comparison; the list keeps
//! insertion order and never holds two entries that normalize equal.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::store::{PersistentStore, StoreResult};

/// Syntactic email-format check.
///
/// Gates both new registrations and dispatch recipients. Deliberately
/// shallow: one `@`-separated local part and a dotted domain, no
/// whitespace. Deliverability is the transport's problem.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
    re.is_match(email)
}

/// Subscriber membership over the persistent list.
pub struct SubscriptionRegistry {
    store: Arc<dyn PersistentStore>,
}

impl SubscriptionRegistry {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// Membership test after trim-normalization.
    pub fn is_registered(&self, email: &str) -> StoreResult<bool> {
        let target = email.trim();
        let subscribers = self.store.load_subscribers()?;
        Ok(subscribers.iter().any(|s| s.trim() == target))
    }

    /// Add `email` to the list.
    ///
    /// Returns `Ok(true)` when newly added, `Ok(false)` as a no-op when an
    /// entry already normalizes equal.
    pub fn register(&self, email: &str) -> StoreResult<bool> {
        let email = email.trim();
        let mut subscribers = self.store.load_subscribers()?;
        if subscribers.iter().any(|s| s.trim() == email) {
            return Ok(false);
        }
        subscribers.push(email.to_string());
        self.store.save_subscribers(&subscribers)?;
        Ok(true)
    }

    /// Remove every entry matching `email` after trim-normalization.
    ///
    /// Returns `Ok(true)` iff at least one entry was removed. Removing the
    /// last entry truncates the resource to empty content.
    pub fn unsubscribe(&self, email: &str) -> StoreResult<bool> {
        let target = email.trim();
        let mut subscribers = self.store.load_subscribers()?;
        let before = subscribers.len();
        subscribers.retain(|s| s.trim() != target);
        if subscribers.len() == before {
            return Ok(false);
        }
        self.store.save_subscribers(&subscribers)?;
        Ok(true)
    }
}
