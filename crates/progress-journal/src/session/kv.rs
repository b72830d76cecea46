use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;

use crate::error::SessionError;

/// A durable string-to-string store, the local equivalent of a browser's
/// `localStorage`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), SessionError>;

    fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError>;
}

/// JSON object file. Every write rewrites the whole file through a temp file
/// and rename, so a crash never leaves it half-written.
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<platform data dir>/progress-journal/session.json`
    pub fn default_location() -> Result<Self, SessionError> {
        let dir = dirs::data_dir().ok_or(SessionError::NoDataDirectory)?;
        Ok(Self::in_directory(dir.join("progress-journal")))
    }

    pub fn in_directory<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read session file {:?}: {}", self.path, e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!("Ignoring corrupt session file {:?}: {}", self.path, e);
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| SessionError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let serialized = serde_json::to_string_pretty(map)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serialized).map_err(|e| SessionError::WriteFile {
            path: tmp_path.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| SessionError::WriteFile {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), SessionError> {
        let mut map = self.read_all();
        for (key, value) in pairs {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.write_all(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError> {
        let mut map = self.read_all();
        for key in keys {
            map.remove(*key);
        }
        self.write_all(&map)
    }
}

/// Process-local store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_values<T>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> T) -> T {
        let mut guard = self
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.with_values(|values| values.get(key).cloned())
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), SessionError> {
        self.with_values(|values| {
            for (key, value) in pairs {
                values.insert((*key).to_string(), (*value).to_string());
            }
        });
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError> {
        self.with_values(|values| {
            for key in keys {
                values.remove(*key);
            }
        });
        Ok(())
    }
}
