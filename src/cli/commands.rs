//! CLI command implementations
//!
//! Each command loads the config, wires the production collaborators
//! (file store, HTTP fetcher, SMTP transport), and runs one operation.
//! `dispatch` is the scheduler entry point: its outcome is appended to
//! the cron log and reflected in the process exit code.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use tracing::info;

use crate::config::Config;
use crate::dispatch::NotificationDispatcher;
use crate::feed::HttpFeedFetcher;
use crate::mailer::{EmailSender, EmailTemplate, SmtpEmailSender};
use crate::registry::{self, SubscriptionRegistry};
use crate::store::{FileStore, PersistentStore};
use crate::verification::VerificationService;

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Append-only outcome log written by the dispatch command
pub const CRON_LOG_FILE: &str = "cron.log";

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Init { config } => init(&config),
        Command::Subscribe { config, email } => subscribe(&config, &email),
        Command::Confirm {
            config,
            email,
            code,
        } => confirm(&config, &email, &code),
        Command::Unsubscribe { config, email } => unsubscribe(&config, &email),
        Command::ConfirmUnsubscribe {
            config,
            email,
            code,
        } => confirm_unsubscribe(&config, &email, &code),
        Command::Dispatch { config } => dispatch(&config),
    }
}

/// Create the data directory and empty resource files.
///
/// Explicit one-time initialization; no other command creates resources
/// as a side effect.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    FileStore::init(config.data_path())?;
    println!("Initialized data directory {}", config.data_dir);
    Ok(())
}

/// Issue a verification code and email it to a prospective subscriber.
pub fn subscribe(config_path: &Path, email: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let email = email.trim();
    if !registry::is_valid_email(email) {
        return Err(CliError::InvalidEmail(email.to_string()));
    }

    let store: Arc<dyn PersistentStore> = Arc::new(FileStore::new(config.data_path()));
    let registry = SubscriptionRegistry::new(store.clone());
    if registry.is_registered(email)? {
        return Err(CliError::AlreadySubscribed(email.to_string()));
    }

    let verification = VerificationService::new(store);
    let code = verification.issue_code(email)?;
    let mailer = SmtpEmailSender::new(config.email.clone());
    mailer.send(EmailTemplate::VerificationCode {
        recipient: email.to_string(),
        code,
    })?;

    println!("Verification code sent to {}", email);
    Ok(())
}

/// Check the submitted code and, on success, register the address.
pub fn confirm(config_path: &Path, email: &str, code: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let email = email.trim();

    let store: Arc<dyn PersistentStore> = Arc::new(FileStore::new(config.data_path()));
    let verification = VerificationService::new(store.clone());
    if !verification.check_code(email, code) {
        return Err(CliError::CodeRejected);
    }
    verification.consume_code(email)?;

    let registry = SubscriptionRegistry::new(store);
    if registry.register(email)? {
        info!("Registered new subscriber {}", email);
        println!("{} is now subscribed", email);
    } else {
        println!("{} was already subscribed", email);
    }
    Ok(())
}

/// Issue an unsubscribe confirmation code and email it.
pub fn unsubscribe(config_path: &Path, email: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let email = email.trim();

    let store: Arc<dyn PersistentStore> = Arc::new(FileStore::new(config.data_path()));
    let registry = SubscriptionRegistry::new(store.clone());
    if !registry.is_registered(email)? {
        return Err(CliError::NotSubscribed(email.to_string()));
    }

    let verification = VerificationService::new(store);
    let code = verification.issue_code(email)?;
    let mailer = SmtpEmailSender::new(config.email.clone());
    mailer.send(EmailTemplate::UnsubscribeConfirmation {
        recipient: email.to_string(),
        code,
    })?;

    println!("Unsubscribe confirmation code sent to {}", email);
    Ok(())
}

/// Check the submitted code and, on success, remove the address.
pub fn confirm_unsubscribe(config_path: &Path, email: &str, code: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let email = email.trim();

    let store: Arc<dyn PersistentStore> = Arc::new(FileStore::new(config.data_path()));
    let verification = VerificationService::new(store.clone());
    if !verification.check_code(email, code) {
        return Err(CliError::CodeRejected);
    }
    verification.consume_code(email)?;

    let registry = SubscriptionRegistry::new(store);
    if registry.unsubscribe(email)? {
        info!("Removed subscriber {}", email);
        println!("{} has been unsubscribed", email);
    } else {
        println!("{} was not subscribed", email);
    }
    Ok(())
}

/// Run one dispatch cycle and record the outcome in the cron log.
pub fn dispatch(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let store = Arc::new(FileStore::new(config.data_path()));
    let feed = Arc::new(HttpFeedFetcher::new(config.feed.clone()));
    let mailer = Arc::new(SmtpEmailSender::new(config.email.clone()));
    let dispatcher =
        NotificationDispatcher::new(store, feed, mailer, config.unsubscribe_url.clone());

    match dispatcher.dispatch_digest() {
        Ok(report) => {
            append_cron_log(
                config.data_path(),
                &format!(
                    "CRON job executed successfully - timeline updates sent to {} of {} subscribers",
                    report.sent, report.attempted
                ),
            )?;
            println!(
                "Dispatch completed: {} of {} deliveries succeeded",
                report.sent, report.attempted
            );
            Ok(())
        }
        Err(e) => {
            append_cron_log(config.data_path(), &format!("CRON job failed: {}", e))?;
            Err(CliError::from(e))
        }
    }
}

/// Append one timestamped line to the cron log.
fn append_cron_log(data_dir: &Path, message: &str) -> CliResult<()> {
    let path = data_dir.join(CRON_LOG_FILE);
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "[{}] {}", timestamp, message)?;
    Ok(())
}
