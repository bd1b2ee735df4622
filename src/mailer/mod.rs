//! # Mail Transport
//!
//! Email sending for the subscription flows and the digest broadcast.
//! The transport is fire-and-forget: per-message success or failure,
//! no bounce handling, no retry.

pub mod errors;

pub use errors::{MailError, MailResult};

use std::collections::HashSet;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Sender identity and SMTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP server host
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP server port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username (empty for unauthenticated local relays)
    #[serde(default)]
    pub smtp_user: String,

    /// SMTP password (should come from secrets)
    #[serde(default)]
    pub smtp_password: String,

    /// From and Reply-To address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From display name
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}
fn default_smtp_port() -> u16 {
    1025
}
fn default_from_email() -> String {
    "no-reply@example.com".to_string()
}
fn default_from_name() -> String {
    "Timeline Digest".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

/// Email template types
#[derive(Debug, Clone)]
pub enum EmailTemplate {
    /// Subscription verification code
    VerificationCode { recipient: String, code: String },

    /// Unsubscription confirmation code
    UnsubscribeConfirmation { recipient: String, code: String },

    /// Pre-rendered digest broadcast
    Digest {
        recipient: String,
        html_body: String,
    },
}

impl EmailTemplate {
    /// The address this message is for
    pub fn recipient(&self) -> &str {
        match self {
            EmailTemplate::VerificationCode { recipient, .. }
            | EmailTemplate::UnsubscribeConfirmation { recipient, .. }
            | EmailTemplate::Digest { recipient, .. } => recipient,
        }
    }
}

/// Email sender trait for abstraction
pub trait EmailSender: Send + Sync {
    /// Send an email
    fn send(&self, template: EmailTemplate) -> MailResult<()>;
}

/// Mock email sender for testing
#[derive(Debug, Default)]
pub struct MockEmailSender {
    /// Sent emails (for testing)
    pub sent: RwLock<Vec<EmailTemplate>>,
    rejected: RwLock<HashSet<String>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of sent emails
    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }

    /// Recipients of all sent emails, in send order
    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .read()
            .unwrap()
            .iter()
            .map(|t| t.recipient().to_string())
            .collect()
    }

    /// Make every delivery to `recipient` fail
    pub fn reject_recipient(&self, recipient: &str) {
        self.rejected.write().unwrap().insert(recipient.to_string());
    }

    /// Clear sent emails
    pub fn clear(&self) {
        self.sent.write().unwrap().clear();
    }
}

impl EmailSender for MockEmailSender {
    fn send(&self, template: EmailTemplate) -> MailResult<()> {
        if self.rejected.read().unwrap().contains(template.recipient()) {
            return Err(MailError::Transport(format!(
                "mock rejected {}",
                template.recipient()
            )));
        }
        self.sent.write().unwrap().push(template);
        Ok(())
    }
}

/// SMTP email sender
pub struct SmtpEmailSender {
    config: EmailConfig,
}

impl SmtpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn render_template(&self, template: &EmailTemplate) -> (String, String, String) {
        match template {
            EmailTemplate::VerificationCode { recipient, code } => {
                let subject = "Your Verification Code".to_string();
                let body = format!("<p>Your verification code is: <strong>{}</strong></p>", code);
                (recipient.clone(), subject, body)
            }
            EmailTemplate::UnsubscribeConfirmation { recipient, code } => {
                let subject = "Confirm Unsubscription".to_string();
                let body = format!(
                    "<p>To confirm unsubscription, use this code: <strong>{}</strong></p>",
                    code
                );
                (recipient.clone(), subject, body)
            }
            EmailTemplate::Digest {
                recipient,
                html_body,
            } => {
                let subject = "Latest GitHub Updates".to_string();
                (recipient.clone(), subject, html_body.clone())
            }
        }
    }
}

impl EmailSender for SmtpEmailSender {
    fn send(&self, template: EmailTemplate) -> MailResult<()> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials, Message,
            SmtpTransport, Transport,
        };

        let (to, subject, body) = self.render_template(&template);

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);
        let email = Message::builder()
            .from(from
                .parse()
                .map_err(|e| MailError::InvalidAddress(format!("from address: {}", e)))?)
            .reply_to(
                self.config
                    .from_email
                    .parse()
                    .map_err(|e| MailError::InvalidAddress(format!("reply-to address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailError::InvalidAddress(format!("to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| MailError::BuildFailed(e.to_string()))?;

        // Unauthenticated direct connection for local development relays,
        // authenticated relay otherwise.
        let mailer = if self.config.smtp_user.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_user.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| MailError::Transport(format!("SMTP relay error: {}", e)))?
                .credentials(creds)
                .port(self.config.smtp_port)
                .build()
        };

        mailer
            .send(&email)
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}
