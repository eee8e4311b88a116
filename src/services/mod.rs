//! Service layer for the relay.
//!
//! This module contains the external collaborators:
//! - Feed fetching (`FeedFetcher`, `RssFetcher`)
//! - Message delivery (`Messenger`, `TelegramClient`)

mod feed;
mod telegram;

pub use feed::{FeedFetcher, RssFetcher, parse_entries};
pub use telegram::{Messenger, OutboundMessage, ParseMode, TelegramClient};
