//! SQLite record store
//!
//! One `messages` table, unique on (timestamp, message). Every write is a
//! single autocommit statement with bound parameters, so a sync that stops
//! halfway leaves only complete rows behind and the watermark reflects exactly
//! what was stored.

use crate::codec::{decode_text, encode_text};
use crate::range::TimeRange;
use crate::record::Record;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-text count before percentages are applied
#[derive(Debug, Clone, PartialEq)]
pub struct TextCount {
    pub text: String,
    pub count: u64,
}

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (or create) the database file and ensure the schema
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        log::debug!("Opened record store at {}", db_path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<(), StoreError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'messages')",
            [],
            |row| row.get(0),
        )?;

        if exists {
            log::info!("messages table exists");
        } else {
            self.conn.execute(
                "CREATE TABLE IF NOT EXISTS messages (
                    message TEXT,
                    user TEXT,
                    timestamp REAL,
                    UNIQUE(timestamp, message)
                )",
                [],
            )?;
            log::info!("✅ Created messages table");
        }

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp)",
            [],
        )?;

        Ok(())
    }

    /// Insert unless (timestamp, text) is already stored
    ///
    /// Returns `true` when a new row was written.
    pub fn insert(&self, record: &Record) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO messages (message, user, timestamp) VALUES (?1, ?2, ?3)",
            params![encode_text(&record.text), record.author_id, record.timestamp],
        )?;
        Ok(changed > 0)
    }

    /// Highest stored timestamp, the resume point for the next sync
    pub fn latest_timestamp(&self) -> Result<Option<f64>, StoreError> {
        let latest = self
            .conn
            .query_row("SELECT MAX(timestamp) FROM messages", [], |row| row.get::<_, Option<f64>>(0))
            .optional()?
            .flatten();
        Ok(latest)
    }

    pub fn len(&self) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Total records in `range` plus a count per distinct text
    ///
    /// The same range filter feeds both numbers. Rows come back ordered by
    /// count descending, then by decoded text ascending.
    pub fn count_and_group(&self, range: &TimeRange) -> Result<(u64, Vec<TextCount>), StoreError> {
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM messages
             WHERE (?1 IS NULL OR timestamp >= ?1)
               AND (?2 IS NULL OR timestamp <= ?2)",
            params![range.start(), range.end()],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT message, COUNT(*) AS cnt FROM messages
             WHERE (?1 IS NULL OR timestamp >= ?1)
               AND (?2 IS NULL OR timestamp <= ?2)
             GROUP BY message",
        )?;

        let rows = stmt.query_map(params![range.start(), range.end()], |row| {
            let stored: Option<String> = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok(TextCount {
                text: decode_text(stored.as_deref().unwrap_or_default()),
                count: count as u64,
            })
        })?;

        let mut groups = rows.collect::<Result<Vec<_>, _>>()?;
        groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));

        Ok((total as u64, groups))
    }
}
