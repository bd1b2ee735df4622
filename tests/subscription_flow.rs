//! End-to-end subscription lifecycle against a real data directory:
//! issue a code, confirm, dispatch a digest, unsubscribe, and observe
//! the flat files at every step.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use mailfeed::dispatch::{DispatchError, NotificationDispatcher};
use mailfeed::feed::{Actor, FeedEvent, MockFeedSource};
use mailfeed::mailer::MockEmailSender;
use mailfeed::registry::SubscriptionRegistry;
use mailfeed::store::{FileStore, PersistentStore};
use mailfeed::verification::VerificationService;

const UNSUB: &str = "http://localhost/unsubscribe.php";

fn event(kind: &str, login: &str) -> FeedEvent {
    FeedEvent {
        kind: Some(kind.to_string()),
        actor: Some(Actor {
            login: Some(login.to_string()),
        }),
    }
}

#[test]
fn full_lifecycle_subscribe_dispatch_unsubscribe() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FileStore::init(tmp.path()).unwrap());
    let registry = SubscriptionRegistry::new(store.clone());
    let verification = VerificationService::new(store.clone());

    // Subscription: code round trip, then registration.
    let code = verification.issue_code("alice@example.com").unwrap();
    assert!(!verification.check_code("alice@example.com", "000000"));
    assert!(verification.check_code("alice@example.com", &code));
    verification.consume_code("alice@example.com").unwrap();
    assert!(!verification.check_code("alice@example.com", &code));
    assert!(registry.register("alice@example.com").unwrap());
    assert!(registry.is_registered("alice@example.com").unwrap());

    // The list survives a store reopen.
    let reopened = Arc::new(FileStore::new(tmp.path()));
    let registry = SubscriptionRegistry::new(reopened.clone());
    assert!(registry.is_registered("alice@example.com").unwrap());

    // Dispatch reaches the one subscriber with the rendered digest.
    let feed = Arc::new(MockFeedSource::with_events(vec![
        event("PushEvent", "octocat"),
        event("ForkEvent", "hubot"),
    ]));
    let mailer = Arc::new(MockEmailSender::new());
    let dispatcher =
        NotificationDispatcher::new(reopened.clone(), feed, mailer.clone(), UNSUB);
    let report = dispatcher.dispatch_digest().unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(report.attempted, 1);
    assert_eq!(mailer.recipients(), vec!["alice@example.com".to_string()]);

    // Unsubscription truncates the list file to empty content.
    let code = verification.issue_code("alice@example.com").unwrap();
    assert!(verification.check_code("alice@example.com", &code));
    verification.consume_code("alice@example.com").unwrap();
    assert!(registry.unsubscribe("alice@example.com").unwrap());
    assert!(!registry.is_registered("alice@example.com").unwrap());
    assert_eq!(
        fs::read_to_string(tmp.path().join("registered_emails.txt")).unwrap(),
        ""
    );

    // With nobody left, the next cycle refuses to run.
    let feed = Arc::new(MockFeedSource::with_events(vec![event("PushEvent", "a")]));
    let mailer = Arc::new(MockEmailSender::new());
    let dispatcher = NotificationDispatcher::new(reopened, feed.clone(), mailer.clone(), UNSUB);
    assert!(matches!(
        dispatcher.dispatch_digest(),
        Err(DispatchError::NoSubscribers)
    ));
    assert_eq!(feed.call_count(), 0);
    assert_eq!(mailer.sent_count(), 0);
}

#[test]
fn verification_codes_persist_across_reopen() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FileStore::init(tmp.path()).unwrap());
    let verification = VerificationService::new(store);

    let code = verification.issue_code("bob@example.com").unwrap();

    let reopened: Arc<dyn PersistentStore> = Arc::new(FileStore::new(tmp.path()));
    let verification = VerificationService::new(reopened);
    assert!(verification.check_code("bob@example.com", &code));
}
