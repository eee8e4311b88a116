//! Ordered delivery of selected entries.
//!
//! Each entry is formatted, posted, and only then recorded in the seen
//! store. A crash between posting and recording re-delivers the entry on the
//! next run instead of losing it.

use std::time::Duration;

use crate::error::Result;
use crate::models::Entry;
use crate::pipeline::Selection;
use crate::services::{Messenger, OutboundMessage};
use crate::storage::SeenStore;
use crate::utils::html::{decode_entities, escape, normalize};

/// Counters for one delivery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
}

/// Posts a feed's selection oldest first and commits each entry afterwards.
pub struct DeliveryOrchestrator<'a> {
    store: &'a SeenStore,
    messenger: &'a dyn Messenger,
    chat_id: i64,
    interval: Duration,
}

impl<'a> DeliveryOrchestrator<'a> {
    /// Create an orchestrator posting to `chat_id`, pausing `interval` after
    /// every message.
    pub fn new(
        store: &'a SeenStore,
        messenger: &'a dyn Messenger,
        chat_id: i64,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            messenger,
            chat_id,
            interval,
        }
    }

    /// Deliver `selection` for `feed`.
    ///
    /// The first delivery failure is returned immediately; entries posted
    /// before it stay recorded.
    pub async fn run(&self, feed: &str, selection: &Selection) -> Result<DeliveryReport> {
        let mut report = DeliveryReport::default();

        for entry in selection.delivery_order() {
            log::info!("Sending post: {}", entry.title);

            let message = OutboundMessage::html(self.chat_id, render_message(feed, entry));
            self.messenger.send(&message).await?;

            if !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }

            self.store.record(feed, &entry.link, entry)?;
            report.delivered += 1;
        }

        Ok(report)
    }
}

/// Render the chat message for one entry.
///
/// Layout: italic feed name, bold title, converted body, link, separated by
/// blank lines.
pub fn render_message(feed: &str, entry: &Entry) -> String {
    let body = entry
        .body
        .as_deref()
        .map(|body| normalize(&decode_entities(body)))
        .unwrap_or_default();

    format!(
        "<i>{}</i>\n\n<b>{}</b>\n\n{}\n\n{}",
        escape(feed),
        escape(&entry.title),
        body,
        escape(&entry.link)
    )
}
