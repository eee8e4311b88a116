// src/services/feed.rs

//! Feed fetching service.
//!
//! Downloads an RSS document and maps its items to [`Entry`] values.

use async_trait::async_trait;
use reqwest::Client;
use rss::Channel;

use crate::error::{AppError, Result};
use crate::models::{Entry, FeedSource, FetchConfig};
use crate::utils::http::{create_async_client, fetch_bytes};

/// Source of feed entries.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the current entry list of `feed`, in document order.
    async fn fetch(&self, feed: &FeedSource) -> Result<Vec<Entry>>;
}

/// Fetches RSS 2.0 feeds over HTTP.
pub struct RssFetcher {
    client: Client,
}

impl RssFetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl FeedFetcher for RssFetcher {
    async fn fetch(&self, feed: &FeedSource) -> Result<Vec<Entry>> {
        log::debug!("GET {}", feed.url);

        let bytes = fetch_bytes(&self.client, &feed.url)
            .await
            .map_err(|e| AppError::fetch(&feed.name, e))?;

        let entries = parse_entries(&bytes).map_err(|e| AppError::fetch(&feed.name, e))?;
        log::debug!("Feed {} returned {} items", feed.name, entries.len());
        Ok(entries)
    }
}

/// Parse an RSS document into entries.
///
/// The body is the item description, or `content:encoded` when the
/// description is missing.
pub fn parse_entries(bytes: &[u8]) -> std::result::Result<Vec<Entry>, rss::Error> {
    let channel = Channel::read_from(bytes)?;

    let entries = channel
        .items()
        .iter()
        .map(|item| Entry {
            title: item.title().unwrap_or_default().to_string(),
            link: item.link().unwrap_or_default().to_string(),
            body: item.description().or(item.content()).map(str::to_string),
            published_at: item.pub_date().map(str::to_string),
        })
        .collect();

    Ok(entries)
}
