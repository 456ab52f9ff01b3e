//! CLI bootstrap: the composition root.
//!
//! Resolves the data directory, loads settings from the environment and
//! opens the preference store. Handlers receive the resulting
//! [`CliContext`].

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use readout_core::paths::PREFERENCES_FILE_NAME;
use readout_core::{JsonFilePreferences, PreferencesStore, SpeechSettings, ensure_data_root};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Data directory override; the platform default is used when `None`.
    pub data_dir: Option<PathBuf>,
}

impl CliConfig {
    pub fn with_data_dir(data_dir: Option<PathBuf>) -> Self {
        Self { data_dir }
    }
}

/// Everything the command handlers need.
pub struct CliContext {
    pub data_root: PathBuf,
    /// Settings from defaults plus `READOUT_*` overrides.
    pub settings: SpeechSettings,
    pub preferences: Arc<JsonFilePreferences>,
}

impl CliContext {
    /// The preference store as the port the sequencer expects.
    pub fn preferences_store(&self) -> Arc<dyn PreferencesStore> {
        self.preferences.clone()
    }
}

/// Build the CLI context.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let data_root = match config.data_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)?;
            dir
        }
        None => ensure_data_root()?,
    };

    let settings = SpeechSettings::from_env()?;
    let preferences = JsonFilePreferences::open(data_root.join(PREFERENCES_FILE_NAME))?;
    tracing::debug!(data_root = %data_root.display(), "CLI context ready");

    Ok(CliContext {
        data_root,
        settings,
        preferences: Arc::new(preferences),
    })
}
