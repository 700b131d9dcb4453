// src/toggle/store.rs
//! Persistent storage for the toggle flag
//!
//! A store is bound to one key and holds a single string value.
//! `"true"` means enabled; anything else, including no value, means disabled.

use crate::utils::config::ToggleConfig;
use crate::utils::errors::Result;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info, warn};

/// Key/value slot holding the persisted flag
pub trait PersistentToggle: Send + Sync {
    fn read(&self) -> Option<String>;
    fn write(&self, value: &str) -> Result<()>;
}

/// SQLite-backed store
pub struct SqliteToggleStore {
    db: Mutex<Connection>,
    key: String,
}

impl SqliteToggleStore {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self::with_connection(conn, key)?;
        info!("Toggle store opened at {:?}", path.as_ref());
        Ok(store)
    }

    /// Open the database named in the toggle config, bound to its storage key
    pub fn from_config(config: &ToggleConfig) -> Result<Self> {
        Self::open(&config.db_path, config.storage_key.clone())
    }

    pub fn in_memory(key: impl Into<String>) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, key)
    }

    fn with_connection(conn: Connection, key: impl Into<String>) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS toggle_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(Self {
            db: Mutex::new(conn),
            key: key.into(),
        })
    }
}

impl PersistentToggle for SqliteToggleStore {
    fn read(&self) -> Option<String> {
        let db = self.db.lock();
        let result = db
            .query_row(
                "SELECT value FROM toggle_state WHERE key = ?",
                params![self.key],
                |row| row.get::<_, String>(0),
            )
            .optional();

        match result {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read toggle {}: {}", self.key, e);
                None
            }
        }
    }

    fn write(&self, value: &str) -> Result<()> {
        let db = self.db.lock();
        db.execute(
            "INSERT INTO toggle_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![self.key, value],
        )?;
        debug!("Persisted {} = {}", self.key, value);
        Ok(())
    }
}

/// In-process store, shareable between controller instances to simulate restarts
#[derive(Default)]
pub struct MemoryToggleStore {
    value: Mutex<Option<String>>,
}

impl MemoryToggleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a raw value
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl PersistentToggle for MemoryToggleStore {
    fn read(&self) -> Option<String> {
        self.value.lock().clone()
    }

    fn write(&self, value: &str) -> Result<()> {
        *self.value.lock() = Some(value.to_string());
        Ok(())
    }
}
