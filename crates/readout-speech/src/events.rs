//! Events emitted by the sequencer to display panels.

use readout_core::{EngineFailure, PlaybackActivity};
use serde::Serialize;

/// Events emitted by the sequencer to the UI layer.
///
/// Serializes as `{"type": "...", "data": ...}` for panel bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Playback activity changed.
    StateChanged(PlaybackActivity),

    /// The text was segmented for a new session.
    ChunksReady {
        /// Number of chunks to be spoken.
        count: usize,
    },

    /// The engine confirmed it started speaking a chunk.
    #[serde(rename_all = "camelCase")]
    ChunkStarted { index: usize, total: usize },

    /// The last chunk finished and playback returned to idle.
    Finished,

    /// Something the user should be told about.
    Notice(PlaybackNotice),
}

/// User-facing notices. Each is also a terminal condition for the session
/// except [`PlaybackNotice::NothingToRead`], which never starts one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "notice", content = "detail", rename_all = "camelCase")]
pub enum PlaybackNotice {
    /// `play` was requested with no text.
    #[error("There is nothing to read")]
    NothingToRead,

    /// A chunk kept ending without ever starting.
    #[error("Playback was interrupted: chunk {} would not start after {attempts} attempts", .index + 1)]
    Interrupted { index: usize, attempts: u32 },

    /// The engine reported a genuine error.
    #[error("Speech playback failed: {0}")]
    Failed(EngineFailure),
}

impl PlaybackNotice {
    /// Message suitable for showing next to the playback controls.
    pub fn user_message(&self) -> String {
        match self {
            Self::NothingToRead => "There is no text to read yet.".to_string(),
            Self::Interrupted { .. } => {
                "Playback was interrupted. Press play to try again.".to_string()
            }
            Self::Failed(EngineFailure::VoiceUnavailable(voice)) => {
                format!("The voice '{voice}' is not available. Choose another voice and try again.")
            }
            Self::Failed(EngineFailure::Network(_)) => {
                "The selected voice needs a network connection. Check your connection or choose a local voice.".to_string()
            }
            Self::Failed(EngineFailure::AudioBusy) => {
                "Audio output is busy. Close other audio and try again.".to_string()
            }
            Self::Failed(failure) => format!("Speech playback failed: {failure}."),
        }
    }
}
