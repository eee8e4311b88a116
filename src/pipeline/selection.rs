//! Selection of entries that still need delivery.
//!
//! Drops entries already recorded in the seen store and orders the rest
//! newest first. Delivery walks the result backwards so the chat reads
//! chronologically.

use std::cmp::Reverse;

use crate::error::Result;
use crate::models::Entry;
use crate::storage::SeenStore;

/// Unseen entries of one feed, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<Entry>,
}

impl Selection {
    /// Check if there is anything to deliver.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of selected entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Selected entries, newest first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Selected entries in delivery order (oldest first).
    pub fn delivery_order(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().rev()
    }

}

impl From<Vec<Entry>> for Selection {
    /// Wrap entries that are already ordered newest first.
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

/// Select the entries of `feed` that were never delivered.
///
/// Only an exact stored-link match removes an entry. Entries are sorted by
/// publication time, newest first; entries whose timestamp does not parse
/// sort after every dated entry. The sort is stable, so equal timestamps
/// keep feed order.
pub fn select(store: &SeenStore, feed: &str, entries: Vec<Entry>) -> Result<Selection> {
    let mut unseen = Vec::with_capacity(entries.len());
    for entry in entries {
        if !store.contains(feed, &entry.link)? {
            unseen.push(entry);
        }
    }

    unseen.sort_by_key(|entry| Reverse(entry.published()));

    Ok(Selection { entries: unseen })
}
