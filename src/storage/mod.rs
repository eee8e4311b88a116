//! Durable storage for delivery receipts.
//!
//! A single SQLite file holds one namespace per feed:
//!
//! ```text
//! feedrelay.db
//! ├── namespaces     # one row per feed name
//! └── seen_entries   # (feed, link) -> JSON snapshot of the delivered entry
//! ```
//!
//! Only set membership is meaningful; row order is not.

pub mod seen;

// Re-export for convenience
pub use seen::SeenStore;
