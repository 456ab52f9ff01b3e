//! Platform-specific data directory lookup.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Name of the application directory under the platform data dir.
const APP_DIR_NAME: &str = "readout";

/// Get the root directory for application data (preferences, `.env`).
///
/// Resolution order:
/// 1. `READOUT_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/readout`)
///
/// The directory is not created here; see
/// [`ensure_data_root`](super::ensure_data_root).
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var("READOUT_DATA_DIR") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data_dir.join(APP_DIR_NAME))
}
