//! Tokio driver for the sequencer.
//!
//! The sequencer is synchronous and single-owner. [`SpeechController`] moves
//! it onto a task and feeds it, one at a time, the three kinds of input it
//! reacts to: panel commands, engine notifications, and its own scheduled
//! steps once their delay has elapsed. Because every input is applied to
//! completion before the next one is looked at, no two transitions ever
//! interleave.

use readout_core::{NotificationReceiver, PlaybackSnapshot, VoiceDescriptor};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::error::SpeechError;
use crate::sequencer::{Scheduled, Sequencer};

// ── Commands ───────────────────────────────────────────────────────

/// A command sent from a display panel to the controller task.
#[derive(Debug)]
pub enum PanelCommand {
    /// Replace the document text.
    SetText(String),

    /// Start reading from a chunk.
    Play { from: usize },

    Pause,

    Resume,

    Stop,

    Next,

    Previous,

    /// Jump to a chunk.
    Seek { index: usize },

    /// Change the rate, in percent.
    SetRate { percent: u32 },

    /// Change the voice.
    SetVoice {
        voice: String,
        reply: oneshot::Sender<Result<(), SpeechError>>,
    },

    /// Report the current playback state.
    Snapshot {
        reply: oneshot::Sender<PlaybackSnapshot>,
    },

    /// Report the engine's voices.
    Voices {
        reply: oneshot::Sender<Vec<VoiceDescriptor>>,
    },

    /// Stop playback and shut the task down.
    Close,
}

// ── Handle ─────────────────────────────────────────────────────────

/// Handle to a running sequencer task.
///
/// Fire-and-forget controls return as soon as the command is queued;
/// queries wait for the task to answer. Dropping the handle closes the
/// command channel, which stops playback and ends the task.
pub struct SpeechController {
    cmd_tx: mpsc::UnboundedSender<PanelCommand>,
    task: Option<JoinHandle<()>>,
}

impl SpeechController {
    /// Spawn the driver task for `sequencer`.
    ///
    /// `notifications` must be the receiver returned alongside the
    /// sequencer. Must be called from within a tokio runtime.
    pub fn spawn(sequencer: Sequencer, notifications: NotificationReceiver) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(sequencer, cmd_rx, notifications));
        Self {
            cmd_tx,
            task: Some(task),
        }
    }

    pub fn set_text(&self, text: impl Into<String>) -> Result<(), SpeechError> {
        self.send(PanelCommand::SetText(text.into()))
    }

    pub fn play(&self, from: usize) -> Result<(), SpeechError> {
        self.send(PanelCommand::Play { from })
    }

    pub fn pause(&self) -> Result<(), SpeechError> {
        self.send(PanelCommand::Pause)
    }

    pub fn resume(&self) -> Result<(), SpeechError> {
        self.send(PanelCommand::Resume)
    }

    pub fn stop(&self) -> Result<(), SpeechError> {
        self.send(PanelCommand::Stop)
    }

    pub fn next(&self) -> Result<(), SpeechError> {
        self.send(PanelCommand::Next)
    }

    pub fn previous(&self) -> Result<(), SpeechError> {
        self.send(PanelCommand::Previous)
    }

    pub fn seek(&self, index: usize) -> Result<(), SpeechError> {
        self.send(PanelCommand::Seek { index })
    }

    pub fn set_rate(&self, percent: u32) -> Result<(), SpeechError> {
        self.send(PanelCommand::SetRate { percent })
    }

    /// Change the voice, failing if the engine does not offer it.
    pub async fn set_voice(&self, voice: impl Into<String>) -> Result<(), SpeechError> {
        let (reply, rx) = oneshot::channel();
        self.send(PanelCommand::SetVoice {
            voice: voice.into(),
            reply,
        })?;
        rx.await.map_err(|_| SpeechError::ControllerClosed)?
    }

    /// Current playback state.
    pub async fn snapshot(&self) -> Result<PlaybackSnapshot, SpeechError> {
        let (reply, rx) = oneshot::channel();
        self.send(PanelCommand::Snapshot { reply })?;
        rx.await.map_err(|_| SpeechError::ControllerClosed)
    }

    /// Voices offered by the engine.
    pub async fn voices(&self) -> Result<Vec<VoiceDescriptor>, SpeechError> {
        let (reply, rx) = oneshot::channel();
        self.send(PanelCommand::Voices { reply })?;
        rx.await.map_err(|_| SpeechError::ControllerClosed)
    }

    /// Stop playback, shut the task down and wait for it to finish.
    pub async fn close(mut self) -> Result<(), SpeechError> {
        // The task may already be gone; joining below still succeeds
        let _ = self.cmd_tx.send(PanelCommand::Close);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Speech controller task ended abnormally");
            }
        }
        Ok(())
    }

    fn send(&self, command: PanelCommand) -> Result<(), SpeechError> {
        self.cmd_tx
            .send(command)
            .map_err(|_| SpeechError::ControllerClosed)
    }
}

// ── Task ───────────────────────────────────────────────────────────

async fn run(
    mut sequencer: Sequencer,
    mut cmd_rx: mpsc::UnboundedReceiver<PanelCommand>,
    mut notifications: NotificationReceiver,
) {
    tracing::debug!("Speech controller started");
    let mut timer: Option<(Instant, Scheduled)> = None;

    loop {
        if let Some(next) = sequencer.take_scheduled() {
            timer = Some((Instant::now() + next.delay, next));
        }
        let deadline = timer.map(|(at, _)| at);

        tokio::select! {
            command = cmd_rx.recv() => match command {
                Some(PanelCommand::Close) | None => break,
                Some(command) => apply(&mut sequencer, command),
            },
            Some(notification) = notifications.recv() => {
                sequencer.handle_notification(notification);
            }
            () = sleep_until_deadline(deadline) => {
                if let Some((_, scheduled)) = timer.take() {
                    sequencer.fire(scheduled);
                }
            }
        }
    }

    sequencer.close();
    tracing::debug!("Speech controller stopped");
}

fn apply(sequencer: &mut Sequencer, command: PanelCommand) {
    match command {
        PanelCommand::SetText(text) => sequencer.set_text(text),
        PanelCommand::Play { from } => sequencer.play(from),
        PanelCommand::Pause => sequencer.pause(),
        PanelCommand::Resume => sequencer.resume(),
        PanelCommand::Stop => sequencer.stop(),
        PanelCommand::Next => sequencer.seek_next(),
        PanelCommand::Previous => sequencer.seek_previous(),
        PanelCommand::Seek { index } => sequencer.seek(index),
        PanelCommand::SetRate { percent } => {
            sequencer.set_rate(percent);
        }
        PanelCommand::SetVoice { voice, reply } => {
            let _ = reply.send(sequencer.set_voice(voice));
        }
        PanelCommand::Snapshot { reply } => {
            let _ = reply.send(sequencer.snapshot());
        }
        PanelCommand::Voices { reply } => {
            let _ = reply.send(sequencer.list_voices());
        }
        PanelCommand::Close => sequencer.close(),
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
