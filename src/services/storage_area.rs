// calmfeed Storage Area
// Persistent key-value store with change notifications. Values are JSON;
// rows live in the `storage_area` table.

use std::sync::{Mutex, MutexGuard};

use rusqlite::OptionalExtension;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::database::migrations::unix_now;
use crate::database::Database;
use crate::types::errors::StorageError;
use crate::types::message::StorageChange;

/// Capacity of the change broadcast. Slow subscribers skip what they miss.
const CHANGE_CAPACITY: usize = 64;

/// Trait defining the storage area interface.
pub trait StorageAreaTrait: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    /// Writes `value` under `key`, notifying subscribers if it changed.
    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// SQLite-backed storage area.
pub struct SqliteStorageArea {
    db: Mutex<Database>,
    changes: broadcast::Sender<StorageChange>,
}

impl SqliteStorageArea {
    pub fn new(db: Database) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            db: Mutex::new(db),
            changes,
        }
    }

    /// A storage area over a fresh in-memory database.
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, StorageError> {
        self.db
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("Lock error: {}", e)))
    }

    fn read(db: &Database, key: &str) -> Result<Option<Value>, StorageError> {
        let raw: Option<String> = db
            .connection()
            .query_row(
                "SELECT value FROM storage_area WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn notify(&self, key: &str, old_value: Option<Value>, new_value: Option<Value>) {
        let change = StorageChange {
            key: key.to_string(),
            old_value,
            new_value,
        };
        // No receivers is not an error.
        let receivers = self.changes.send(change).unwrap_or(0);
        debug!(key, receivers, "storage changed");
    }
}

impl StorageAreaTrait for SqliteStorageArea {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let db = self.lock()?;
        Self::read(&db, key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let old = {
            let db = self.lock()?;
            // An unreadable previous value is overwritten.
            let old = Self::read(&db, key).unwrap_or(None);
            if old.as_ref() == Some(&value) {
                return Ok(());
            }
            db.connection().execute(
                "INSERT INTO storage_area (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![key, serde_json::to_string(&value)?, unix_now()],
            )?;
            old
        };
        self.notify(key, old, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let old = {
            let db = self.lock()?;
            let old = Self::read(&db, key).unwrap_or(None);
            db.connection()
                .execute("DELETE FROM storage_area WHERE key = ?1", rusqlite::params![key])?;
            old
        };
        if old.is_some() {
            self.notify(key, old, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
