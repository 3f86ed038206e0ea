// On-disk local storage backed by SQLite

use crate::models::now_ms;
use crate::storage::Storage;
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CURRENT_VERSION: u32 = 1;

/// Name of the store directory created under the chosen path
pub const STORE_DIR: &str = ".tasklist";

/// Persistent key-value storage in `<path>/.tasklist/tasklist.db`
///
/// Holds an exclusive lock on `tasklist.lock` while open, so a second
/// process opening the same directory fails instead of racing writes.
pub struct SqliteStorage {
    base_path: PathBuf,
    db: Connection,
    _lock: File,
}

impl SqliteStorage {
    /// Open or create a store at the given path
    ///
    /// The store will be created in a `.tasklist` subdirectory of the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().join(STORE_DIR);

        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let lock_path = base_path.join("tasklist.lock");
        let lock = File::create(&lock_path).context("Failed to create lock file")?;
        lock.try_lock_exclusive()
            .map_err(|_| eyre!("Store at {} is in use by another process", base_path.display()))?;

        let db_path = base_path.join("tasklist.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let storage = Self {
            base_path,
            db,
            _lock: lock,
        };

        storage.create_schema()?;
        storage.create_gitignore()?;
        storage.write_version()?;

        info!(path = ?storage.base_path, "Opened local storage");
        Ok(storage)
    }

    /// Get the base path of this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Keys currently stored, in key order
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.db.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    fn create_gitignore(&self) -> Result<()> {
        let gitignore_path = self.base_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(
                gitignore_path,
                "tasklist.db\ntasklist.db-shm\ntasklist.db-wal\ntasklist.lock\n",
            )?;
        }
        Ok(())
    }

    fn write_version(&self) -> Result<()> {
        let version_path = self.base_path.join(".version");
        if !version_path.exists() {
            fs::write(version_path, CURRENT_VERSION.to_string())?;
        }
        Ok(())
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(eyre!("Storage key cannot be empty or whitespace-only"));
        }
        if key.len() > 256 {
            return Err(eyre!("Storage key too long: {} chars (max 256)", key.len()));
        }
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        Self::validate_key(key)?;
        debug!(key, bytes = value.len(), "set");

        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now_ms()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        debug!(key, "remove");
        self.db.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory() {
        let temp = TempDir::new().unwrap();

        let storage = SqliteStorage::open(temp.path()).unwrap();
        let store_path = temp.path().join(".tasklist");
        assert_eq!(storage.base_path(), store_path);
        assert!(store_path.join("tasklist.db").exists());
        assert!(store_path.join(".gitignore").exists());
        assert!(store_path.join(".version").exists());
    }

    #[test]
    fn test_get_set_remove() {
        let temp = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open(temp.path()).unwrap();

        assert_eq!(storage.get("tasks").unwrap(), None);

        storage.set("tasks", "[]").unwrap();
        storage.set("statuses", "[\"Todo\"]").unwrap();
        assert_eq!(storage.get("tasks").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.keys().unwrap(), vec!["statuses", "tasks"]);

        storage.set("tasks", "[1]").unwrap();
        assert_eq!(storage.get("tasks").unwrap().as_deref(), Some("[1]"));

        storage.remove("tasks").unwrap();
        assert_eq!(storage.get("tasks").unwrap(), None);
        storage.remove("tasks").unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let mut storage = SqliteStorage::open(temp.path()).unwrap();
            storage.set("isAuthenticated", "true").unwrap();
        }

        let storage = SqliteStorage::open(temp.path()).unwrap();
        assert_eq!(storage.get("isAuthenticated").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_second_open_is_rejected_while_locked() {
        let temp = TempDir::new().unwrap();
        let _first = SqliteStorage::open(temp.path()).unwrap();

        let second = SqliteStorage::open(temp.path());
        assert!(second.is_err());
    }

    #[test]
    fn test_invalid_key() {
        let temp = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open(temp.path()).unwrap();

        assert!(storage.set("", "x").is_err());
        assert!(storage.set("   ", "x").is_err());
        assert!(storage.set(&"k".repeat(257), "x").is_err());
    }
}
