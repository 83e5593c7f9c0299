// Persistence Adapter - one durable slot for the whole working set.
//
// The store serializes to a single JSON blob under a fixed key in a
// string-keyed state store. Restore treats anything unreadable as "no
// saved state": a corrupt slot is logged and skipped, never a crash.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};
use crate::store::CatalogStore;

/// Fixed key under which the entire catalog state blob lives.
pub const STATE_KEY: &str = "catalog_state";

/// String-keyed durable store. The catalog only ever uses one key, but the
/// contract is a generic get/set slot.
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

// ============================================================================
// SQLITE BACKING
// ============================================================================

/// Durable backing: a single `app_state(key, value)` table in SQLite.
pub struct SqliteStateStore {
    conn: Connection,
}

impl SqliteStateStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(SqliteStateStore { conn })
    }
}

impl StateStore for SqliteStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY BACKING (tests)
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slots: HashMap<String, String>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        MemoryStateStore::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// SAVE / RESTORE
// ============================================================================

/// Serialize the full store under [`STATE_KEY`]. Called after every
/// mutation; a failure leaves the in-memory store valid and is surfaced
/// to the caller.
pub fn save(store: &CatalogStore, state: &mut dyn StateStore) -> Result<()> {
    let blob =
        serde_json::to_string(store).map_err(|err| CatalogError::Internal(err.to_string()))?;
    state.set(STATE_KEY, &blob)?;

    debug!(
        records = store.len(),
        batches = store.batches().len(),
        "catalog state saved"
    );
    Ok(())
}

/// Deserialize the saved store, or `None` when there is nothing usable.
/// An unreadable slot or corrupt blob is logged and treated as absent so
/// startup can fall back to an empty catalog.
pub fn restore(state: &dyn StateStore) -> Option<CatalogStore> {
    let blob = match state.get(STATE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(err) => {
            warn!("could not read saved state: {err}");
            return None;
        }
    };

    match serde_json::from_str::<CatalogStore>(&blob) {
        Ok(store) => {
            debug!(
                records = store.len(),
                batches = store.batches().len(),
                "catalog state restored"
            );
            Some(store)
        }
        Err(err) => {
            warn!("saved catalog state is corrupt, starting empty: {err}");
            None
        }
    }
}
