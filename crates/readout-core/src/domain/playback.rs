//! Playback activity and the read-only snapshot handed to display panels.

use serde::{Deserialize, Serialize};

/// What the speech sequencer is currently doing.
///
/// `Stopping` is transient: it is entered while a stop is being applied and
/// always collapses back to `Idle` before control returns to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackActivity {
    /// Nothing is playing. Playback can always be (re)started from here.
    #[default]
    Idle,

    /// A chunk is being spoken, or the next one is about to be submitted.
    Speaking,

    /// Playback is suspended at a recorded resume point.
    Paused,

    /// A stop is being applied.
    Stopping,
}

impl PlaybackActivity {
    /// Short lowercase label, used in logs and serialized snapshots.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Speaking => "speaking",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
        }
    }

    /// Whether a playback session is in progress (speaking or paused).
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Speaking | Self::Paused)
    }
}

impl std::fmt::Display for PlaybackActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Point-in-time view of the playback state, for display panels and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    /// Current activity.
    pub activity: PlaybackActivity,
    /// Cursor into the chunk list. Meaningful only while active.
    pub current_index: usize,
    /// Number of chunks in the current session (0 before the first play).
    pub chunk_count: usize,
    /// Chunk currently marked in the display, if any.
    pub highlighted_index: Option<usize>,
    /// Retries spent on the current chunk.
    pub retry_count: u32,
    /// Whether a cancellation has been requested but not yet confirmed.
    pub pending_cancel: bool,
    /// Voice used for the next submission.
    pub voice: Option<String>,
    /// Playback rate in percent (100 = normal speed).
    pub rate_percent: u16,
}
