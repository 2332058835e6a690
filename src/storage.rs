use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Store key for the most recent period start (`YYYY-MM-DD`).
pub const LAST_PERIOD_START_KEY: &str = "lastPeriodStart";
/// Store key for the append-only history (JSON array of `YYYY-MM-DD`).
pub const PERIODS_HISTORY_KEY: &str = "periodsHistory";
/// Store key for the persisted [`crate::models::CycleConfig`] JSON object.
pub const SETTINGS_KEY: &str = "settings";
/// Store key for the pending reminder's opaque scheduler handle.
pub const NOTIFICATION_ID_KEY: &str = "notificationId";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data directory not found")]
    NoDataDir,
}

/// Durable string key-value store. Callers serialize access themselves; the
/// engine assumes at most one in-flight write per key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Single-file store: one flat JSON object of string keys and values,
/// rewritten in full on every change. Fine for a handful of small keys.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open the store at the platform data directory
    /// (`<data_local_dir>/cyklus/store.json`), creating the directory if
    /// needed.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = dirs::data_local_dir()
            .ok_or(StorageError::NoDataDir)?
            .join("cyklus");
        fs::create_dir_all(&dir)?;
        Ok(Self::at(dir.join("store.json")))
    }

    /// Open the store at an explicit path. The file is created on first
    /// write.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Ephemeral store for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert!(store.get("missing").unwrap().is_none());

        store.set(LAST_PERIOD_START_KEY, "2024-06-01").unwrap();
        assert_eq!(
            store.get(LAST_PERIOD_START_KEY).unwrap().as_deref(),
            Some("2024-06-01")
        );

        store.remove(LAST_PERIOD_START_KEY).unwrap();
        assert!(store.get(LAST_PERIOD_START_KEY).unwrap().is_none());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::at(path.clone());
        store
            .set(PERIODS_HISTORY_KEY, r#"["2024-06-01","2024-05-04"]"#)
            .unwrap();
        store.set(NOTIFICATION_ID_KEY, "reminder-7").unwrap();
        drop(store);

        let reopened = FileStore::at(path);
        assert_eq!(
            reopened.get(PERIODS_HISTORY_KEY).unwrap().as_deref(),
            Some(r#"["2024-06-01","2024-05-04"]"#)
        );
        assert_eq!(
            reopened.get(NOTIFICATION_ID_KEY).unwrap().as_deref(),
            Some("reminder-7")
        );
    }

    #[test]
    fn file_store_reads_empty_before_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::at(dir.path().join("store.json"));
        assert!(store.get(SETTINGS_KEY).unwrap().is_none());
    }

    #[test]
    fn file_store_remove_deletes_only_that_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::at(dir.path().join("store.json"));
        store.set(SETTINGS_KEY, "{}").unwrap();
        store.set(NOTIFICATION_ID_KEY, "42").unwrap();

        store.remove(NOTIFICATION_ID_KEY).unwrap();
        assert!(store.get(NOTIFICATION_ID_KEY).unwrap().is_none());
        assert_eq!(store.get(SETTINGS_KEY).unwrap().as_deref(), Some("{}"));
    }
}
