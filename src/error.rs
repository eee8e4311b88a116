// src/error.rs

//! Unified error handling for the relay.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The seen-store file could not be opened or prepared
    #[error("Store unavailable at {path}: {message}")]
    StoreUnavailable { path: String, message: String },

    /// A query against an opened seen-store failed
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The feed could not be fetched or parsed
    #[error("Fetch failed for feed '{feed}': {message}")]
    Fetch { feed: String, message: String },

    /// The messaging surface rejected or failed a message
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a store-unavailable error for the given database path.
    pub fn store_unavailable(path: impl AsRef<Path>, message: impl fmt::Display) -> Self {
        Self::StoreUnavailable {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a fetch error for a named feed.
    pub fn fetch(feed: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            feed: feed.into(),
            message: message.to_string(),
        }
    }

    /// Create a delivery error.
    pub fn delivery(message: impl fmt::Display) -> Self {
        Self::Delivery(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
