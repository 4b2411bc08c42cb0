use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};

/// Raw string slot storage. Values are opaque to the backend.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Returns whether a value was present.
    fn remove(&mut self, key: &str) -> Result<bool>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.slots.remove(key).is_some())
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let store = SqliteStore { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteStore { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv_store (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv_store WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

/// Backend whose writes always fail.
#[cfg(test)]
pub(crate) struct FullStore;

#[cfg(test)]
impl KeyValueStore for FullStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        anyhow::bail!("quota exceeded")
    }

    fn remove(&mut self, _key: &str) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut dyn KeyValueStore) {
        assert!(store.get("k").unwrap().is_none());

        store.set("k", "one").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("one"));

        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));

        assert!(store.remove("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
        assert!(!store.remove("k").unwrap());
    }

    #[test]
    fn test_memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        exercise(&mut store);
    }

    #[test]
    fn test_sqlite_store_get_set_remove() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        exercise(&mut store);
    }


    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macrolog.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("slot", "{\"version\":1}").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("{\"version\":1}"));
    }

    #[test]
    fn test_sqlite_migrate_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.migrate().unwrap();
        let version: i64 = store
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
