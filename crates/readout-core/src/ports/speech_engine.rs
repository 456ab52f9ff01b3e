//! Speech engine port: the host's single-slot speech synthesis capability.
//!
//! The engine speaks one utterance at a time and reports progress
//! asynchronously. It is treated as unreliable: it may never start an
//! utterance, end one without having started it, or ignore pause/resume
//! requests issued at the wrong moment.
//!
//! Every submission carries an [`UtteranceNotifier`] that was bound to the
//! chunk index and submission serial **when the request was built**. Engines
//! report through the notifier; the sequencer decides whether a notification
//! is still relevant by comparing its [`UtteranceTag`] with the submission it
//! currently tracks.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::VoiceDescriptor;

/// Identifies one submission: its position in the chunk list and a serial
/// that is unique for the lifetime of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceTag {
    /// Monotonic submission counter.
    pub serial: u64,
    /// Chunk index the submission was issued for.
    pub index: usize,
}

/// Why an utterance failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum EngineFailure {
    /// The utterance was cancelled on request.
    #[error("utterance was cancelled")]
    Canceled,

    /// The utterance was cut off by a cancel or a newer submission.
    #[error("utterance was interrupted")]
    Interrupted,

    /// The audio output device is in use or unavailable.
    #[error("audio output is busy")]
    AudioBusy,

    /// The requested voice does not exist on this engine.
    #[error("voice '{0}' is not available")]
    VoiceUnavailable(String),

    /// A network-backed voice could not be reached.
    #[error("network voice unavailable: {0}")]
    Network(String),

    /// Any other synthesis error reported by the engine.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}

impl EngineFailure {
    /// Whether this failure is the echo of an intentional cancellation rather
    /// than a genuine synthesis problem.
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::Interrupted)
    }
}

/// Progress signal for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSignal {
    /// The engine started speaking.
    Started,
    /// The engine finished (or silently dropped) the utterance.
    Ended,
    /// The engine reported an error.
    Failed(EngineFailure),
}

/// A tagged notification as delivered to the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineNotification {
    /// Submission this notification refers to.
    pub tag: UtteranceTag,
    /// What happened.
    pub signal: EngineSignal,
}

/// Sending half of the notification channel.
pub type NotificationSender = mpsc::UnboundedSender<EngineNotification>;

/// Receiving half of the notification channel, owned by the event loop.
pub type NotificationReceiver = mpsc::UnboundedReceiver<EngineNotification>;

/// Create the channel engines use to report utterance progress.
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}

/// Callback bundle for one submission, bound by value to its tag.
///
/// Cloning is cheap; engines may hand clones to timers or worker tasks.
#[derive(Debug, Clone)]
pub struct UtteranceNotifier {
    tag: UtteranceTag,
    tx: NotificationSender,
}

impl UtteranceNotifier {
    /// Bind a notifier to `tag`.
    pub const fn new(tag: UtteranceTag, tx: NotificationSender) -> Self {
        Self { tag, tx }
    }

    /// The submission this notifier reports for.
    pub const fn tag(&self) -> UtteranceTag {
        self.tag
    }

    /// Report that speech started.
    pub fn started(&self) {
        self.send(EngineSignal::Started);
    }

    /// Report that the utterance ended.
    pub fn ended(&self) {
        self.send(EngineSignal::Ended);
    }

    /// Report an error.
    pub fn failed(&self, failure: EngineFailure) {
        self.send(EngineSignal::Failed(failure));
    }

    fn send(&self, signal: EngineSignal) {
        let notification = EngineNotification {
            tag: self.tag,
            signal,
        };
        if self.tx.send(notification).is_err() {
            tracing::debug!(serial = self.tag.serial, "Notification receiver dropped");
        }
    }
}

/// One chunk submission.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// Text to speak.
    pub text: String,
    /// Voice identifier, or `None` for the engine default.
    pub voice: Option<String>,
    /// Rate multiplier (1.0 = normal speed).
    pub rate: f32,
    /// Notifier bound to this submission.
    pub notifier: UtteranceNotifier,
}

impl EngineRequest {
    /// Tag of this submission.
    pub const fn tag(&self) -> UtteranceTag {
        self.notifier.tag()
    }
}

/// Backend-agnostic speech engine.
///
/// Implementations are driven from a single owner (the sequencer) and must
/// be `Send` so that owner can live on a tokio task.
pub trait SpeechEngine: Send {
    /// Queue `request` for speaking and return its handle.
    ///
    /// A synchronous `Err` means the utterance was rejected outright; no
    /// notifications will follow for it.
    fn submit(&mut self, request: EngineRequest) -> Result<UtteranceTag, EngineFailure>;

    /// Ask the engine to pause the current utterance.
    fn pause_current(&mut self);

    /// Ask the engine to resume a paused utterance.
    fn resume_current(&mut self);

    /// Ask the engine to drop the current utterance. Confirmation, if any,
    /// arrives later as an `Ended` or cancellation `Failed` notification.
    fn cancel_current(&mut self);

    /// Whether the engine holds an utterance (speaking or paused).
    fn is_busy(&self) -> bool;

    /// Whether the engine reports itself paused.
    fn is_paused(&self) -> bool;

    /// Try to change the rate of the utterance being spoken.
    ///
    /// Returns `false` when the engine cannot adjust an utterance in flight;
    /// the new rate then applies from the next submission.
    fn set_rate_current(&mut self, _rate: f32) -> bool {
        false
    }

    /// Voices this engine can speak with.
    fn list_voices(&self) -> Vec<VoiceDescriptor>;
}
