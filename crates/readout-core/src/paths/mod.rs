//! Path utilities for readout's data directory.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - OS-specific lookup is kept private in `platform`

mod error;
mod platform;

use std::fs;
use std::path::{Path, PathBuf};

pub use error::PathError;
pub use platform::data_root;

/// File name of the preference store inside the data root.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Location of the JSON preference store.
pub fn preferences_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(PREFERENCES_FILE_NAME))
}

/// Location of the `.env` file that stores user overrides.
pub fn env_file_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(".env"))
}

/// Resolve the data root and create it if it is missing.
pub fn ensure_data_root() -> Result<PathBuf, PathError> {
    let root = data_root()?;
    ensure_directory(&root)?;
    Ok(root)
}

fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
