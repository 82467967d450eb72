//! Durable key→string preference storage.
//!
//! Everything user-configurable (unit, text size, sound, brightness, the saved
//! city list, the API key) lives behind the [`PreferenceStore`] trait so the
//! registry and settings layers never care where the bytes go. The default
//! implementation is a TOML file in the platform config directory.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine platform config directory")]
    NoConfigDir,

    #[error("failed to read preferences: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write preferences: {0}")]
    Write(#[source] std::io::Error),

    #[error("preference file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Opaque durable key/value store. Implementations must expose atomic-replace
/// semantics: a reader never observes a partially written value.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Flat TOML document holding all preferences.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences(HashMap<String, String>);

/// File-backed store in the platform config directory.
#[derive(Debug, Clone)]
pub struct TomlStore {
    path: PathBuf,
}

impl TomlStore {
    /// Store at the platform default location.
    pub fn open_default() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("dev", "weather-time", "weather-time-cli")
            .ok_or(StoreError::NoConfigDir)?;

        Ok(Self { path: dirs.config_dir().join("preferences.toml") })
    }

    /// Store at an explicit path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StoreError> {
        if !self.path.exists() {
            // First run: nothing saved yet.
            return Ok(HashMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(StoreError::Read)?;
        let prefs: Preferences = toml::from_str(&contents)?;

        Ok(prefs.0)
    }

    /// Full rewrite via a temp file and rename, so the file is replaced atomically.
    fn write_all(&self, entries: HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Write)?;
        }

        let payload = toml::to_string_pretty(&Preferences(entries))?;

        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, payload).map_err(StoreError::Write)?;
        fs::rename(&tmp, &self.path).map_err(StoreError::Write)?;

        Ok(())
    }
}

impl PreferenceStore for TomlStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(entries)?;
        }
        Ok(())
    }
}

/// In-memory store, used by tests and available to embedders that do not want
/// anything on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The map stays usable after a panic in another holder of the lock.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }
}
