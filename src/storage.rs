//! Key-value persistence behind the saved-range repository.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{TrainerError, TrainerResult};

/// A string-keyed store of string values, in the manner of browser local storage.
///
/// Calls are synchronous and fallible. Callers make one attempt and never retry.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> TrainerResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> TrainerResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_entry(key: &str, value: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> TrainerResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> TrainerResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> FileStore {
        FileStore { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> TrainerResult<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> TrainerResult<()> {
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(self.path(key), value))
            .map_err(|e| TrainerError::Storage(e.to_string()))
    }
}
