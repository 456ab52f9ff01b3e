//! Playback bookkeeping owned by the sequencer.

use std::time::Duration;

use readout_core::{PlaybackActivity, UtteranceTag};

/// Mutable state of one playback session.
#[derive(Debug, Default)]
pub(crate) struct PlaybackState {
    pub chunks: Vec<String>,
    pub current_index: usize,
    pub activity: PlaybackActivity,
    pub pending_cancel: bool,
    pub retry_count: u32,
    pub highlighted_index: Option<usize>,
}

impl PlaybackState {
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.chunks.len()
    }
}

/// The submission the sequencer is currently tracking.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InFlight {
    pub tag: UtteranceTag,
    /// The engine confirmed it started speaking.
    pub started: bool,
}

/// Deferred work the sequencer asks its driver to run later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Submit the chunk at `index`.
    Submit { index: usize },
    /// Check that a requested pause took effect.
    ConfirmPause,
}

/// A step plus the delay after which it should run.
///
/// Only the most recently scheduled step is live; anything scheduled before
/// a stop, seek, pause or resume is ignored when fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub step: Step,
    pub delay: Duration,
    pub(crate) generation: u64,
}
