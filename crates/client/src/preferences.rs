//! Persisted user preferences (remembered scan method, preferred page size).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nooryx_inventory::ScanMethod;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub scan_method: Option<ScanMethod>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("no preferences directory available on this platform")]
    NoConfigDir,
    #[error("preferences io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preferences file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Result<Preferences, PreferenceError>;
    fn save(&self, prefs: &Preferences) -> Result<(), PreferenceError>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/nooryx/preferences.json`.
    pub fn default_location() -> Result<Self, PreferenceError> {
        let dir = dirs::config_dir().ok_or(PreferenceError::NoConfigDir)?;
        Ok(Self::new(dir.join("nooryx").join("preferences.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PreferenceError {
        PreferenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    /// A missing file means "no preferences yet".
    fn load(&self) -> Result<Preferences, PreferenceError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Preferences::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, prefs: &Preferences) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let data = serde_json::to_string_pretty(prefs)?;
        std::fs::write(&self.path, data).map_err(|e| self.io_error(e))
    }
}

/// In-process store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    inner: Mutex<Preferences>,
}

impl MemoryPreferenceStore {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            inner: Mutex::new(prefs),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Preferences, PreferenceError> {
        Ok(self.inner.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn save(&self, prefs: &Preferences) -> Result<(), PreferenceError> {
        *self.inner.lock().unwrap_or_else(|p| p.into_inner()) = prefs.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());
    }

    #[test]
    fn file_store_persists_scan_method() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("nested").join("prefs.json"));

        let prefs = Preferences {
            scan_method: Some(ScanMethod::Hardware),
            page_size: Some(50),
        };
        store.save(&prefs).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"hardware\""));
        assert_eq!(FilePreferenceStore::new(store.path()).load().unwrap(), prefs);
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FilePreferenceStore::new(path).load(),
            Err(PreferenceError::Parse(_))
        ));
    }
}
