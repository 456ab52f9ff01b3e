//! CLI-specific error types and exit codes.

use readout_core::{CoreError, PathError, PreferencesError, SettingsError};
use readout_speech::SpeechError;
use readout_summary::SummaryError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Argument error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playback could not be started or controlled.
    #[error("Playback error: {0}")]
    Playback(String),
}

impl CliError {
    /// Map error to an exit code following sysexits.h where one fits.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 2,  // EX_USAGE
            Self::Playback(_) => 69,  // EX_UNAVAILABLE
            Self::Io(_) => 74,        // EX_IOERR
            Self::Config(_) => 78,    // EX_CONFIG
        }
    }
}

/// Exit code for an error that reached `main`.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Settings(e) => Self::Config(e.to_string()),
            CoreError::Preferences(e @ PreferencesError::Io { .. }) => Self::Io(e.to_string()),
            CoreError::Preferences(e) => Self::Config(e.to_string()),
            CoreError::Path(e) => Self::Config(e.to_string()),
            CoreError::Validation(msg) => Self::Arguments(msg),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<PreferencesError> for CliError {
    fn from(err: PreferencesError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<SpeechError> for CliError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Settings(e) => Self::Config(e.to_string()),
            e @ SpeechError::UnknownVoice(_) => Self::Arguments(e.to_string()),
            e @ SpeechError::ControllerClosed => Self::Playback(e.to_string()),
        }
    }
}

impl From<SummaryError> for CliError {
    fn from(err: SummaryError) -> Self {
        Self::Core(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
