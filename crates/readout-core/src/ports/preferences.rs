//! Preference storage port.
//!
//! A flat key/value store for user choices that outlive a display panel
//! (default voice, playback rate). Values are strings; typed access lives in
//! [`SpeechPreferences`](crate::preferences::SpeechPreferences).

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a preference store.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// Reading or writing the backing file failed.
    #[error("Failed to access preferences at {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// The backing file does not contain a flat JSON object of strings.
    #[error("Preferences file {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// The key is empty.
    #[error("Preference key cannot be empty")]
    EmptyKey,
}

/// Synchronous key/value preference storage.
pub trait PreferencesStore: Send + Sync {
    /// Return the stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError>;
}
