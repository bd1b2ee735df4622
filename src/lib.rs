//! mailfeed - periodic email digests of public GitHub activity
//!
//! Subscribers are kept in a newline-delimited flat file, identity is
//! proven with short-lived one-time codes, and a cron-invoked dispatch
//! cycle mails the rendered digest to everyone on the list.

pub mod cli;
pub mod config;
pub mod digest;
pub mod dispatch;
pub mod feed;
pub mod mailer;
pub mod registry;
pub mod store;
pub mod verification;
