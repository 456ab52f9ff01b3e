//! JSON-file preference store.
//!
//! The file holds a single flat object of string values. Writes go to a
//! sibling temp file first and are renamed into place, so a crash mid-write
//! never leaves a truncated store behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::ports::{PreferencesError, PreferencesStore};

/// Preference store backed by a JSON file.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFilePreferences {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store; it is created on the first `set`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let values = if path.exists() {
            read_values(&path)?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "Opened preferences");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored entries, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), PreferencesError> {
        let io_err = |e: std::io::Error| PreferencesError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(values).map_err(|e| PreferencesError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl PreferencesStore for JsonFilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        if key.trim().is_empty() {
            return Err(PreferencesError::EmptyKey);
        }

        let mut values = self.lock();
        let previous = values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&values) {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
            return Err(e);
        }

        tracing::debug!(key, "Stored preference");
        Ok(())
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>, PreferencesError> {
    let content = fs::read_to_string(path).map_err(|e| PreferencesError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    serde_json::from_str(&content).map_err(|e| PreferencesError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
