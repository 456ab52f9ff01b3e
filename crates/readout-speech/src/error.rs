//! Read-aloud error types.

use readout_core::SettingsError;

/// Errors surfaced by the speech crate's fallible entry points.
///
/// Playback problems that happen *during* a session (engine failures,
/// exhausted retries) are not errors here; they are reported as
/// [`PlaybackNotice`](crate::PlaybackNotice) events and the sequencer
/// returns to idle on its own.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// The settings handed to the sequencer are out of range.
    #[error("Invalid speech settings: {0}")]
    Settings(#[from] SettingsError),

    /// The requested voice is not offered by the engine.
    #[error("Unknown voice '{0}'")]
    UnknownVoice(String),

    /// The controller task has shut down.
    #[error("Speech controller is no longer running")]
    ControllerClosed,
}
