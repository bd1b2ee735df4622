//! # Notification Dispatch
//!
//! One dispatch cycle: load the subscriber list, fetch the feed, render
//! the digest once, and fan it out to every valid address. Best-effort
//! broadcast - a failing address never blocks the rest, and the cycle
//! succeeds iff at least one delivery was accepted.

pub mod errors;

pub use errors::{DispatchError, DispatchResult};

use std::sync::Arc;

use tracing::{error, info};

use crate::digest;
use crate::feed::FeedSource;
use crate::mailer::{EmailSender, EmailTemplate};
use crate::registry;
use crate::store::PersistentStore;

/// Tally of one dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Deliveries the transport accepted
    pub sent: usize,
    /// Valid addresses a delivery was attempted for
    pub attempted: usize,
}

/// Broadcast of the rendered digest to every registered subscriber
pub struct NotificationDispatcher {
    store: Arc<dyn PersistentStore>,
    feed: Arc<dyn FeedSource>,
    mailer: Arc<dyn EmailSender>,
    unsubscribe_url: String,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn PersistentStore>,
        feed: Arc<dyn FeedSource>,
        mailer: Arc<dyn EmailSender>,
        unsubscribe_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            feed,
            mailer,
            unsubscribe_url: unsubscribe_url.into(),
        }
    }

    /// Run one dispatch cycle.
    ///
    /// The same rendered body goes to every recipient - there is no
    /// per-subscriber personalization. Addresses that fail the syntactic
    /// check are skipped silently and never counted as attempted.
    pub fn dispatch_digest(&self) -> DispatchResult<DispatchReport> {
        let subscribers = match self.store.load_subscribers() {
            Ok(subscribers) => subscribers,
            Err(e) => {
                error!("Subscriber list unavailable: {}", e);
                return Err(DispatchError::NoSubscribers);
            }
        };
        if subscribers.is_empty() {
            return Err(DispatchError::NoSubscribers);
        }

        let events = match self.feed.fetch() {
            Ok(events) => events,
            Err(e) => {
                error!("Failed to fetch timeline events: {}", e);
                return Err(DispatchError::Feed(e));
            }
        };

        let body = digest::render_digest(&events, &self.unsubscribe_url);

        let mut sent = 0;
        let mut attempted = 0;
        for address in &subscribers {
            let address = address.trim();
            if address.is_empty() || !registry::is_valid_email(address) {
                continue;
            }
            attempted += 1;
            let message = EmailTemplate::Digest {
                recipient: address.to_string(),
                html_body: body.clone(),
            };
            match self.mailer.send(message) {
                Ok(()) => sent += 1,
                Err(e) => error!("Failed to send digest to {}: {}", address, e),
            }
        }

        info!("Digest sent to {} out of {} subscribers", sent, attempted);
        if sent == 0 {
            return Err(DispatchError::NothingDelivered { attempted });
        }
        Ok(DispatchReport { sent, attempted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Actor, FeedEvent, MockFeedSource};
    use crate::mailer::MockEmailSender;
    use crate::store::MemoryStore;

    const UNSUB: &str = "http://localhost/unsubscribe.php";

    fn event(kind: &str, login: &str) -> FeedEvent {
        FeedEvent {
            kind: Some(kind.to_string()),
            actor: Some(Actor {
                login: Some(login.to_string()),
            }),
        }
    }

    fn store_with(subscribers: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let subscribers: Vec<String> = subscribers.iter().map(|s| s.to_string()).collect();
        store.save_subscribers(&subscribers).unwrap();
        store
    }

    fn dispatcher(
        store: Arc<MemoryStore>,
        feed: Arc<MockFeedSource>,
        mailer: Arc<MockEmailSender>,
    ) -> NotificationDispatcher {
        NotificationDispatcher::new(store, feed, mailer, UNSUB)
    }

    #[test]
    fn test_no_subscribers_fails_without_fetching() {
        let feed = Arc::new(MockFeedSource::with_events(vec![event("PushEvent", "a")]));
        let mailer = Arc::new(MockEmailSender::new());
        let d = dispatcher(store_with(&[]), feed.clone(), mailer.clone());

        let result = d.dispatch_digest();

        assert!(matches!(result, Err(DispatchError::NoSubscribers)));
        assert_eq!(feed.call_count(), 0);
        assert_eq!(mailer.sent_count(), 0);
    }

    #[test]
    fn test_feed_failure_aborts_before_any_send() {
        let feed = Arc::new(MockFeedSource::failing());
        let mailer = Arc::new(MockEmailSender::new());
        let d = dispatcher(store_with(&["a@example.com"]), feed, mailer.clone());

        let result = d.dispatch_digest();

        assert!(matches!(result, Err(DispatchError::Feed(_))));
        assert_eq!(mailer.sent_count(), 0);
    }

    #[test]
    fn test_malformed_address_skipped_silently() {
        let feed = Arc::new(MockFeedSource::with_events(vec![event("PushEvent", "a")]));
        let mailer = Arc::new(MockEmailSender::new());
        let d = dispatcher(
            store_with(&["a@example.com", "not-an-email", "b@example.com"]),
            feed,
            mailer.clone(),
        );

        let report = d.dispatch_digest().unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.sent, 2);
        assert_eq!(
            mailer.recipients(),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
    }

    #[test]
    fn test_empty_lines_are_not_attempted() {
        let feed = Arc::new(MockFeedSource::with_events(vec![event("PushEvent", "a")]));
        let mailer = Arc::new(MockEmailSender::new());
        let d = dispatcher(
            store_with(&["a@example.com", "", "   "]),
            feed,
            mailer.clone(),
        );

        let report = d.dispatch_digest().unwrap();

        assert_eq!(report.attempted, 1);
        assert_eq!(report.sent, 1);
    }

    #[test]
    fn test_one_failing_delivery_does_not_block_the_rest() {
        let feed = Arc::new(MockFeedSource::with_events(vec![event("PushEvent", "a")]));
        let mailer = Arc::new(MockEmailSender::new());
        mailer.reject_recipient("b@example.com");
        let d = dispatcher(
            store_with(&["a@example.com", "b@example.com", "c@example.com"]),
            feed,
            mailer.clone(),
        );

        let report = d.dispatch_digest().unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.sent, 2);
        assert_eq!(
            mailer.recipients(),
            vec!["a@example.com".to_string(), "c@example.com".to_string()]
        );
    }

    #[test]
    fn test_all_deliveries_failing_is_an_error() {
        let feed = Arc::new(MockFeedSource::with_events(vec![event("PushEvent", "a")]));
        let mailer = Arc::new(MockEmailSender::new());
        mailer.reject_recipient("a@example.com");
        let d = dispatcher(store_with(&["a@example.com"]), feed, mailer.clone());

        let result = d.dispatch_digest();

        assert!(matches!(
            result,
            Err(DispatchError::NothingDelivered { attempted: 1 })
        ));
    }

    #[test]
    fn test_every_recipient_gets_the_same_body() {
        let feed = Arc::new(MockFeedSource::with_events(vec![event("PushEvent", "a")]));
        let mailer = Arc::new(MockEmailSender::new());
        let d = dispatcher(
            store_with(&["a@example.com", "b@example.com"]),
            feed,
            mailer.clone(),
        );

        d.dispatch_digest().unwrap();

        let sent = mailer.sent.read().unwrap();
        let bodies: Vec<&str> = sent
            .iter()
            .map(|t| match t {
                EmailTemplate::Digest { html_body, .. } => html_body.as_str(),
                other => panic!("unexpected template: {:?}", other),
            })
            .collect();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0], bodies[1]);
        assert!(bodies[0].contains("PushEvent"));
    }

    #[test]
    fn test_empty_feed_still_dispatches_no_updates_body() {
        let feed = Arc::new(MockFeedSource::with_events(Vec::new()));
        let mailer = Arc::new(MockEmailSender::new());
        let d = dispatcher(store_with(&["a@example.com"]), feed, mailer.clone());

        let report = d.dispatch_digest().unwrap();

        assert_eq!(report.sent, 1);
        let sent = mailer.sent.read().unwrap();
        match &sent[0] {
            EmailTemplate::Digest { html_body, .. } => {
                assert!(html_body.contains("No updates available"));
            }
            other => panic!("unexpected template: {:?}", other),
        }
    }
}
