//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the seen-store database file
    #[serde(default = "defaults::db_path")]
    pub db_path: PathBuf,

    /// Telegram bot credentials and target chat
    pub telegram: TelegramConfig,

    /// HTTP settings for feed fetching
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Delivery pacing and failure policy
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Feeds to relay, processed in order
    #[serde(default)]
    pub feeds: Vec<FeedSource>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.token.trim().is_empty() {
            return Err(AppError::validation("telegram.token is empty"));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        Url::parse(&self.telegram.api_url)?;

        let mut names = HashSet::new();
        for feed in &self.feeds {
            if feed.name.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "Feed with url {} has an empty name",
                    feed.url
                )));
            }
            if !names.insert(feed.name.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate feed name '{}'",
                    feed.name
                )));
            }
            Url::parse(&feed.url).map_err(|e| {
                AppError::validation(format!("Feed '{}' has invalid url: {}", feed.name, e))
            })?;
        }
        Ok(())
    }

    /// Look up a feed by name.
    pub fn feed(&self, name: &str) -> Option<&FeedSource> {
        self.feeds.iter().find(|f| f.name == name)
    }
}

/// A named feed to relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    /// Display name, also the seen-store namespace
    pub name: String,

    /// RSS document URL
    pub url: String,
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token
    pub token: String,

    /// Destination chat
    pub chat_id: i64,

    /// Log Bot API payloads
    #[serde(default)]
    pub send_debug: bool,

    /// Bot API base URL
    #[serde(default = "defaults::api_url")]
    pub api_url: String,
}

/// HTTP settings for fetching feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for feed requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Delivery pacing and failure handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Pause after each delivered message, in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Keep processing other feeds when one feed fails
    #[serde(default)]
    pub isolate_feed_failures: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            isolate_feed_failures: false,
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn db_path() -> PathBuf {
        PathBuf::from("feedrelay.db")
    }
    pub fn api_url() -> String {
        "https://api.telegram.org".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64; rv:97.0) Gecko/20100101 Firefox/97.0".into()
    }
    pub fn timeout() -> u64 {
        240
    }
    pub fn interval() -> u64 {
        10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        db_path = "/tmp/relay.db"

        [telegram]
        token = "123:abc"
        chat_id = -100500

        [[feeds]]
        name = "Example"
        url = "https://example.com/rss.xml"

        [[feeds]]
        name = "Other"
        url = "https://other.example.com/feed"
    "#;

    fn sample() -> Config {
        toml::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_applies_defaults() {
        let config = sample();
        assert_eq!(config.db_path, PathBuf::from("/tmp/relay.db"));
        assert_eq!(config.telegram.chat_id, -100500);
        assert!(!config.telegram.send_debug);
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.fetch.timeout_secs, 240);
        assert_eq!(config.delivery.interval_secs, 10);
        assert!(!config.delivery.isolate_feed_failures);
        assert_eq!(config.feeds.len(), 2);
    }

    #[test]
    fn test_validate_sample_ok() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let mut config = sample();
        config.telegram.token = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_feed_names() {
        let mut config = sample();
        config.feeds[1].name = "Example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_feed_url() {
        let mut config = sample();
        config.feeds[0].url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_feed_lookup_by_name() {
        let config = sample();
        assert_eq!(
            config.feed("Other").map(|f| f.url.as_str()),
            Some("https://other.example.com/feed")
        );
        assert!(config.feed("Missing").is_none());
    }

    #[test]
    fn test_load_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feeds[0].name, "Example");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/feedrelay.toml").unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
