// Typed records persisted under a fixed storage key

use crate::models::{StatusSet, Task};
use crate::storage::{STATUSES_KEY, Storage, TASKS_KEY};
use eyre::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

/// A value persisted as JSON under a single storage key
pub trait Record: Serialize + DeserializeOwned {
    /// Storage key for this record type (e.g., "tasks", "statuses")
    fn key() -> &'static str;
}

impl Record for Vec<Task> {
    fn key() -> &'static str {
        TASKS_KEY
    }
}

impl Record for StatusSet {
    fn key() -> &'static str {
        STATUSES_KEY
    }
}

/// Read and deserialize a record; `None` when the key is absent
pub fn load_record<T: Record, S: Storage + ?Sized>(storage: &S) -> Result<Option<T>> {
    let key = T::key();
    let raw = storage
        .get(key)
        .with_context(|| format!("Failed to read '{}' from storage", key))?;

    match raw {
        Some(json) => {
            let record = serde_json::from_str(&json).with_context(|| format!("Failed to parse '{}'", key))?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

/// Serialize and write a record under its key
pub fn save_record<T: Record, S: Storage + ?Sized>(storage: &mut S, record: &T) -> Result<()> {
    let key = T::key();
    let json = serde_json::to_string(record).with_context(|| format!("Failed to serialize '{}'", key))?;
    storage
        .set(key, &json)
        .with_context(|| format!("Failed to write '{}' to storage", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_record_keys() {
        assert_eq!(<Vec<Task>>::key(), "tasks");
        assert_eq!(StatusSet::key(), "statuses");
    }

    #[test]
    fn test_load_absent_record() {
        let storage = MemoryStorage::new();
        let tasks: Option<Vec<Task>> = load_record(&storage).unwrap();
        assert!(tasks.is_none());
    }

    #[test]
    fn test_save_then_load_tasks() {
        let mut storage = MemoryStorage::new();
        let tasks = vec![
            Task {
                id: 1,
                description: "Buy milk".to_string(),
                status: "Not Started".to_string(),
            },
            Task {
                id: 2,
                description: "Pay rent".to_string(),
                status: "Finished".to_string(),
            },
        ];

        save_record(&mut storage, &tasks).unwrap();
        let raw = storage.get("tasks").unwrap().unwrap();
        assert!(raw.starts_with('['));
        assert!(raw.contains("\"description\":\"Pay rent\""));

        let loaded: Option<Vec<Task>> = load_record(&storage).unwrap();
        assert_eq!(loaded, Some(tasks));
    }

    #[test]
    fn test_load_malformed_record() {
        let mut storage = MemoryStorage::new();
        storage.set("statuses", "{not json").unwrap();

        let result: Result<Option<StatusSet>> = load_record(&storage);
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse 'statuses'"));
    }
}
