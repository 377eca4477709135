// Persisted preferences as a flat string -> string map.
//
// The file-backed store keeps one JSON object next to config.json and rewrites
// it completely on every `set`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::StoreError;

/// Minimal key-value persistence used for user preferences.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// JSON object file, one string value per key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/DefaultOpener/preferences.json`
    pub fn default_location() -> Self {
        Self::new(crate::config::app_dir().join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable file is copied before it is replaced.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let data = fs::read_to_string(&self.path).map_err(|e| {
            StoreError::io(format!("failed to read {}", self.path.display()), e)
        })?;
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&data)?)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let all = self.read_all()?;
        Ok(all.get(key).and_then(Value::as_str).map(str::to_owned))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        // A corrupt file is set aside and replaced rather than blocking every
        // later write.
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(e) => {
                let backup = self.backup_path();
                fs::copy(&self.path, &backup).map_err(|source| {
                    StoreError::io(format!("failed to back up {}", self.path.display()), source)
                })?;
                tracing::warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    "Replacing unreadable preferences: {}",
                    e
                );
                Map::new()
            }
        };
        all.insert(key.to_owned(), Value::String(value));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::io("failed to create preferences directory", e))?;
        }
        let data = serde_json::to_string_pretty(&all)?;
        fs::write(&self.path, data).map_err(|e| {
            StoreError::io(format!("failed to write {}", self.path.display()), e)
        })
    }
}

/// In-memory store for tests and hosts without a writable home.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }
}
