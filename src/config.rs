//! # Configuration
//!
//! JSON configuration file loaded once at startup. Every field except the
//! data directory has a default, so a minimal config is just
//! `{ "data_dir": "./data" }`.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::FeedConfig;
use crate::mailer::EmailConfig;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors. All of them are fatal to the invocation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory holding the flat resources and the cron log (required)
    pub data_dir: String,

    /// Sender identity and SMTP transport
    #[serde(default)]
    pub email: EmailConfig,

    /// Public events feed endpoint
    #[serde(default)]
    pub feed: FeedConfig,

    /// Unsubscribe link embedded in every digest
    #[serde(default = "default_unsubscribe_url")]
    pub unsubscribe_url: String,
}

fn default_unsubscribe_url() -> String {
    "http://localhost/unsubscribe.php".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            source: e,
        })?;

        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }
        if self.feed.url.trim().is_empty() {
            return Err(ConfigError::Invalid("feed.url must not be empty".into()));
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::Invalid("feed.timeout_secs must be > 0".into()));
        }
        if self.email.from_email.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "email.from_email must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let file = write_config(r#"{ "data_dir": "./data" }"#);
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.data_dir, "./data");
        assert_eq!(config.feed.url, "https://api.github.com/events/public");
        assert_eq!(config.feed.timeout_secs, 30);
        assert_eq!(config.email.smtp_host, "localhost");
        assert_eq!(config.email.from_email, "no-reply@example.com");
        assert_eq!(config.unsubscribe_url, "http://localhost/unsubscribe.php");
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let file = write_config(
            r#"{
                "data_dir": "./data",
                "email": { "smtp_host": "smtp.example.com", "smtp_port": 587 },
                "feed": { "timeout_secs": 10 }
            }"#,
        );
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.email.smtp_host, "smtp.example.com");
        assert_eq!(config.email.smtp_port, 587);
        assert_eq!(config.email.from_email, "no-reply@example.com");
        assert_eq!(config.feed.timeout_secs, 10);
        assert_eq!(config.feed.url, "https://api.github.com/events/public");
    }

    #[test]
    fn test_missing_data_dir_is_rejected() {
        let file = write_config(r#"{ "unsubscribe_url": "http://x" }"#);

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let file = write_config(r#"{ "data_dir": "./data", "feed": { "timeout_secs": 0 } }"#);

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let file = write_config("{ not json");

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_rejected() {
        assert!(matches!(
            Config::load(Path::new("/nonexistent/mailfeed.json")),
            Err(ConfigError::Unreadable { .. })
        ));
    }
}
