// src/models/mod.rs

//! Domain models for the relay.

mod config;
mod entry;

// Re-export all public types
pub use config::{Config, DeliveryConfig, FeedSource, FetchConfig, TelegramConfig};
pub use entry::{Entry, PUBLISHED_FORMAT};
