//! # Feed Fetch
//!
//! Retrieves the bounded public event feed that digests are rendered
//! from. Single-shot, fail-fast: one GET with a hard timeout, no retry.

pub mod errors;

pub use errors::{FeedError, FeedResult};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed public events endpoint
const DEFAULT_FEED_URL: &str = "https://api.github.com/events/public";

/// Identifying client header sent with every fetch
const DEFAULT_USER_AGENT: &str = "GitHub Timeline Subscriber v1.0";

/// Accept header for the events API
const EVENTS_ACCEPT: &str = "application/vnd.github.v3+json";

/// Bound on the single outbound read, in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Feed endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Events endpoint URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Identifying User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_url() -> String {
    DEFAULT_FEED_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// One public event, as much of it as the digest needs.
///
/// Both fields are optional on the wire; unknown fields are ignored.
/// Events are transient - fetched per dispatch cycle, never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedEvent {
    /// Event type, e.g. "PushEvent"
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Acting user
    #[serde(default)]
    pub actor: Option<Actor>,
}

/// Nested actor object of an event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Actor {
    pub login: Option<String>,
}

impl FeedEvent {
    /// The actor's login, when the event carries one
    pub fn actor_login(&self) -> Option<&str> {
        self.actor.as_ref().and_then(|a| a.login.as_deref())
    }
}

/// Source of feed events for a dispatch cycle
pub trait FeedSource: Send + Sync {
    /// Single-shot fetch. Any transport failure is surfaced to the caller;
    /// no retry is attempted.
    fn fetch(&self) -> FeedResult<Vec<FeedEvent>>;
}

/// HTTP fetcher against the public events endpoint
pub struct HttpFeedFetcher {
    config: FeedConfig,
}

impl HttpFeedFetcher {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }
}

impl FeedSource for HttpFeedFetcher {
    fn fetch(&self) -> FeedResult<Vec<FeedEvent>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .user_agent(&self.config.user_agent)
            .build()?;

        let response = client
            .get(&self.config.url)
            .header(reqwest::header::ACCEPT, EVENTS_ACCEPT)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Vec<FeedEvent>>()?)
    }
}

/// Canned feed source for testing
#[derive(Debug, Default)]
pub struct MockFeedSource {
    events: Vec<FeedEvent>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockFeedSource {
    /// Source that yields `events` on every fetch
    pub fn with_events(events: Vec<FeedEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Source whose every fetch fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of fetch calls observed
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeedSource for MockFeedSource {
    fn fetch(&self) -> FeedResult<Vec<FeedEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FeedError::Status { status: 503 });
        }
        Ok(self.events.clone())
    }
}
