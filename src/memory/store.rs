//! SQLite-backed memory table.
//!
//! Every operation opens its own connection and drops it before returning,
//! so no handle outlives a call. Writes run inside a transaction that rolls
//! back on drop unless committed.

use super::dedup::exists_similar;
use super::record::{Category, MemoryRecord, NewMemory};
use crate::Result;
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SCHEMA: &str = "
    PRAGMA journal_mode = WAL;
    CREATE TABLE IF NOT EXISTS memories (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        category    TEXT NOT NULL,
        content     TEXT NOT NULL,
        pinned      INTEGER NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_mem_pin ON memories(pinned);
    CREATE INDEX IF NOT EXISTS idx_mem_cat ON memories(category);
";

/// Durable store of memory records in a single SQLite file
#[derive(Debug, Clone)]
pub struct MemoryStore {
    db_path: PathBuf,
}

impl MemoryStore {
    /// Open (creating if needed) the database at `db_path`.
    ///
    /// Connects once up front so a missing directory or corrupt file fails
    /// here rather than on the first command.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            db_path: db_path.into(),
        };
        drop(store.connect()?);
        info!("Memory store ready at {}", store.db_path.display());
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Insert one note. `None` means nothing was added (empty or duplicate).
    pub fn insert(&self, item: &NewMemory) -> Result<Option<i64>> {
        if item.content.is_empty() {
            return Ok(None);
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        if exists_similar(&tx, &item.content)? {
            debug!("Skipping duplicate memory: {}", item.content);
            return Ok(None);
        }
        let id = insert_row(&tx, item)?;
        tx.commit()?;

        debug!("Inserted memory #{} ({})", id, item.category);
        Ok(Some(id))
    }

    /// Insert a batch in one transaction. Each item is validated and
    /// deduplicated like [`insert`](Self::insert), including against items
    /// earlier in the same batch. Returns the number added.
    pub fn insert_many(&self, items: &[NewMemory]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let mut added = 0;
        for item in items {
            if item.content.is_empty() || exists_similar(&tx, &item.content)? {
                continue;
            }
            insert_row(&tx, item)?;
            added += 1;
        }
        tx.commit()?;

        debug!("Batch insert: {} of {} added", added, items.len());
        Ok(added)
    }

    /// Up to `limit` records, pinned first, newest first within each tier.
    pub fn list(&self, limit: usize) -> Result<Vec<MemoryRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, category, content, pinned, created_at FROM memories \
             ORDER BY pinned DESC, id DESC LIMIT ?1",
        )?;
        let records = stmt
            .query_map([limit as i64], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Delete by id. Missing ids are not an error.
    pub fn delete(&self, id: i64) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
        tx.commit()?;
        debug!("Delete memory #{}: {} row(s)", id, removed);
        Ok(())
    }

    /// Remove the database file and its WAL side files.
    pub fn reset_all(&self) -> Result<()> {
        for path in self.db_files() {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        info!("Memory store reset");
        Ok(())
    }

    fn db_files(&self) -> Vec<PathBuf> {
        let base = self.db_path.as_os_str().to_owned();
        let mut files = vec![self.db_path.clone()];
        for suffix in ["-wal", "-shm"] {
            let mut name = base.clone();
            name.push(suffix);
            files.push(PathBuf::from(name));
        }
        files
    }
}

fn insert_row(conn: &Connection, item: &NewMemory) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO memories (category, content, pinned) VALUES (?1, ?2, ?3)",
        params![item.category.as_str(), item.content, item.pinned as i64],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<MemoryRecord> {
    let category: String = row.get(1)?;
    let pinned: i64 = row.get(3)?;
    Ok(MemoryRecord {
        id: row.get(0)?,
        category: Category::coerce(&category),
        content: row.get(2)?,
        pinned: pinned != 0,
        created_at: row.get(4)?,
    })
}
