//! SQLite-backed record of delivered entries.
//!
//! Every feed owns a namespace; an entry is "seen" once a row exists for
//! `(namespace, link)`. Rows carry a JSON snapshot of the entry at delivery
//! time and are never deleted.
//!
//! ## Schema
//!
//! ```text
//! namespaces(name PK)
//! seen_entries(namespace, link, snapshot, recorded_at)  PK(namespace, link)
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{AppError, Result};
use crate::models::Entry;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS namespaces (
        name TEXT PRIMARY KEY NOT NULL
    );
    CREATE TABLE IF NOT EXISTS seen_entries (
        namespace   TEXT NOT NULL,
        link        TEXT NOT NULL,
        snapshot    BLOB NOT NULL,
        recorded_at TEXT NOT NULL,
        PRIMARY KEY (namespace, link)
    );
";

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable per-feed set of delivered entry links.
pub struct SeenStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SeenStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| AppError::store_unavailable(path, e))?;
        Self::init(path.to_path_buf(), conn)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| AppError::store_unavailable(":memory:", e))?;
        Self::init(PathBuf::from(":memory:"), conn)
    }

    fn init(path: PathBuf, conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .and_then(|_| conn.execute_batch(SCHEMA))
            .map_err(|e| AppError::store_unavailable(&path, e))?;

        log::debug!("Opened seen store at {}", path.display());

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Location of the backing database.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::store_unavailable(&self.path, "connection lock poisoned"))
    }

    /// Create the namespace for `feed` if it does not exist yet.
    pub fn ensure_namespace(&self, feed: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO namespaces (name) VALUES (?1)",
            params![feed],
        )
        .map_err(|e| AppError::store_unavailable(&self.path, e))?;
        Ok(())
    }

    /// Check whether `link` was already delivered for `feed`.
    pub fn contains(&self, feed: &str, link: &str) -> Result<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM seen_entries WHERE namespace = ?1 AND link = ?2",
                params![feed, link],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Record `entry` as delivered under `feed`.
    ///
    /// Recording the same link twice overwrites the snapshot.
    pub fn record(&self, feed: &str, link: &str, entry: &Entry) -> Result<()> {
        let snapshot = serde_json::to_vec(entry)?;
        let mut conn = self.lock()?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO namespaces (name) VALUES (?1)",
            params![feed],
        )?;
        tx.execute(
            "INSERT INTO seen_entries (namespace, link, snapshot, recorded_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (namespace, link)
             DO UPDATE SET snapshot = excluded.snapshot, recorded_at = excluded.recorded_at",
            params![feed, link, snapshot, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Read back the snapshot stored for `link`, if any.
    pub fn snapshot(&self, feed: &str, link: &str) -> Result<Option<Entry>> {
        let conn = self.lock()?;
        let bytes: Option<Vec<u8>> = conn
            .query_row(
                "SELECT snapshot FROM seen_entries WHERE namespace = ?1 AND link = ?2",
                params![feed, link],
                |row| row.get(0),
            )
            .optional()?;

        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All namespaces, sorted by name.
    pub fn namespaces(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Number of delivered entries recorded for `feed`.
    pub fn count(&self, feed: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM seen_entries WHERE namespace = ?1",
            params![feed],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
