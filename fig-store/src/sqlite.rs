//! SQLite-backed slot.
//!
//! A single `slots` table maps keys to serialized blobs; a write is one
//! `INSERT OR REPLACE`, so the previous blob is swapped out atomically.

use crate::error::Result;
use crate::slot::Slot;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Returns the SQL schema applied when a slot database is opened.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS slots (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    "#
}

/// Key-value slot stored in a SQLite database file.
pub struct SqliteSlot {
    conn: Connection,
}

impl SqliteSlot {
    /// Open (or create) a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory database, empty after creation.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(create_schema())?;
        Ok(Self { conn })
    }
}

impl Slot for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, blob: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO slots (key, value) VALUES (?1, ?2)",
            params![key, blob],
        )?;
        Ok(())
    }
}
