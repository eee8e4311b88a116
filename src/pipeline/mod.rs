//! Dedup-and-deliver pipeline.
//!
//! - `select`: drop delivered entries, order the rest newest first
//! - `DeliveryOrchestrator`: post oldest first, then record
//! - `Relay`: fetch → select → deliver for every configured feed

pub mod deliver;
pub mod run;
pub mod selection;
#[cfg(test)]
pub(crate) mod testing;

pub use deliver::{DeliveryOrchestrator, DeliveryReport, render_message};
pub use run::{FeedOutcome, Relay, RelayOptions, RunSummary};
pub use selection::{Selection, select};
