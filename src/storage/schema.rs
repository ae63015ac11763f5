//! Store connection and schema management

use rusqlite::Connection;
use std::path::Path;

use crate::yahoo::types::EntityKind;
use crate::Result;

/// Normalized entities keyed by their remote keys, one table per kind.
///
/// Every row holds the entity's canonical JSON serialization, so the same
/// entity always produces the same row.
pub struct EntityStore {
    pub(crate) conn: Connection,
}

impl EntityStore {
    /// Fresh store that lives for the current process only.
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// File-backed store, creating the file and its directory if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        for kind in EntityKind::ALL {
            self.conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        key TEXT PRIMARY KEY,
                        body TEXT NOT NULL
                    )",
                    kind.table()
                ),
                [],
            )?;
        }
        Ok(())
    }
}
