//! Feed entry data structure.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Textual layout of `pubDate` values, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const PUBLISHED_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// The part of [`PUBLISHED_FORMAT`] after the weekday.
const DATE_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// A single item fetched from a feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    /// Entry title
    pub title: String,

    /// Entry URL, unique within its feed
    pub link: String,

    /// HTML body (RSS description)
    #[serde(default)]
    pub body: Option<String>,

    /// Publication timestamp as found in the feed
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Entry {
    /// Create an entry with only a title and link.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            body: None,
            published_at: None,
        }
    }

    /// Set the HTML body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the raw publication timestamp.
    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    /// Parse the publication timestamp.
    ///
    /// Returns `None` when the field is missing or does not match
    /// [`PUBLISHED_FORMAT`]. The weekday only has to be a valid name, it is
    /// not checked against the date.
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.published_at.as_deref()?.trim();
        let (weekday, date) = raw.split_once(", ")?;
        if !WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(weekday)) {
            return None;
        }
        DateTime::parse_from_str(date, DATE_FORMAT).ok()
    }
}
