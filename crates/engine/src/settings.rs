//! Persisted client settings.
//!
//! A small string key-value store kept as pretty-printed JSON on disk and
//! cached in memory. Every write is persisted immediately.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::SettingsError;

/// Settings key holding the user's home domain.
pub const DOMAIN_KEY: &str = "emsg_domain";

/// Domain used when none has been stored.
pub const DEFAULT_DOMAIN: &str = "emsg";

/// JSON-file-backed settings store.
pub struct SettingsStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl SettingsStore {
    /// Creates a store, loading existing values from `path` if the file exists.
    pub fn new(path: PathBuf) -> Result<Self, SettingsError> {
        let values = load_values(&path)?;
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Opens the store at the default per-user location.
    pub fn open_default() -> Result<Self, SettingsError> {
        let path = default_settings_path().ok_or_else(|| {
            SettingsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no user config directory",
            ))
        })?;
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Stores a value and persists the store.
    pub fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.persist()
    }

    /// Removes a value and persists the store.
    pub fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        self.persist()
    }

    /// Returns the stored home domain, or [`DEFAULT_DOMAIN`].
    pub fn domain(&self) -> String {
        self.get(DOMAIN_KEY)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DOMAIN.to_string())
    }

    pub fn set_domain(&self, domain: &str) -> Result<(), SettingsError> {
        self.set(DOMAIN_KEY, domain.trim())
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let map = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let json = serde_json::to_string_pretty(&*map)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        debug!(count = map.len(), path = ?self.path, "persisted settings");
        Ok(())
    }
}

fn load_values(path: &Path) -> Result<HashMap<String, String>, SettingsError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let data = std::fs::read_to_string(path)?;
    let values: HashMap<String, String> = serde_json::from_str(&data)?;
    debug!(count = values.len(), ?path, "loaded settings");
    Ok(values)
}

/// Returns the default settings file path.
pub fn default_settings_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("emsg").join("settings.json"))
}

/// Returns the platform-specific config directory.
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config"))
    }
}
