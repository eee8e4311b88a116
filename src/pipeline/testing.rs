//! In-memory collaborators for pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Entry, FeedSource};
use crate::services::{FeedFetcher, Messenger, OutboundMessage};

/// Messenger that keeps every message and can fail on the n-th call.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<OutboundMessage>>,
    calls: Mutex<usize>,
    fail_at: Option<usize>,
}

impl RecordingMessenger {
    /// Fail the call with zero-based index `call`.
    pub fn failing_at(call: usize) -> Self {
        Self {
            fail_at: Some(call),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls - 1
        };
        if self.fail_at == Some(call) {
            return Err(AppError::delivery("chat unavailable"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Fetcher serving fixed entry lists by feed name; unknown feeds fail.
#[derive(Default)]
pub struct StaticFetcher {
    feeds: HashMap<String, Vec<Entry>>,
}

impl StaticFetcher {
    pub fn with_feed(mut self, name: &str, entries: Vec<Entry>) -> Self {
        self.feeds.insert(name.to_string(), entries);
        self
    }
}

#[async_trait]
impl FeedFetcher for StaticFetcher {
    async fn fetch(&self, feed: &FeedSource) -> Result<Vec<Entry>> {
        self.feeds
            .get(&feed.name)
            .cloned()
            .ok_or_else(|| AppError::fetch(&feed.name, "connection refused"))
    }
}
