//! Speech sequencer: drives an unreliable engine through a list of chunks.
//!
//! ```text
//!            play                end of last chunk / stop / failure
//!   Idle ───────────▶ Speaking ─────────────────────────────────▶ Idle
//!                      │    ▲
//!                pause │    │ resume
//!                      ▼    │
//!                      Paused ──── stop ────▶ Idle
//! ```
//!
//! The sequencer is synchronous and never sleeps. When something has to
//! happen later (the settling delay before a submission, a pause check) it
//! records a [`Scheduled`] step for its driver to fire once the delay has
//! elapsed. [`SpeechController`](crate::SpeechController) is the tokio
//! driver; tests fire steps by hand.
//!
//! Engine notifications arrive tagged with the submission they belong to.
//! Anything that does not match the submission currently tracked is
//! discarded, so a late `end` from a cancelled utterance can never move the
//! cursor or the highlight.

mod state;

pub use state::{Scheduled, Step};

use std::sync::Arc;
use std::time::Duration;

use readout_core::{
    EngineFailure, EngineNotification, EngineRequest, EngineSignal, HighlightRenderer,
    NotificationReceiver, NotificationSender, PlaybackActivity, PlaybackSnapshot,
    PreferencesStore, SpeechEngine, SpeechPreferences, SpeechSettings, UtteranceNotifier,
    UtteranceTag, VoiceDescriptor, clamp_rate_percent, notification_channel, validate_settings,
};
use tokio::sync::mpsc;

use crate::error::SpeechError;
use crate::events::{PlaybackEvent, PlaybackNotice};
use crate::segmenter::segment;
use state::{InFlight, PlaybackState};

/// Receiving ends handed out by [`Sequencer::new`].
#[derive(Debug)]
pub struct SequencerChannels {
    /// Events for display panels.
    pub events: mpsc::UnboundedReceiver<PlaybackEvent>,
    /// Engine notifications, to be fed back through
    /// [`Sequencer::handle_notification`].
    pub notifications: NotificationReceiver,
}

/// The read-aloud state machine.
pub struct Sequencer {
    settings: SpeechSettings,

    /// Text of the current document, segmented lazily on play.
    text: String,

    state: PlaybackState,

    engine: Box<dyn SpeechEngine>,

    highlighter: Box<dyn HighlightRenderer>,

    /// Where voice and rate choices are persisted, if anywhere.
    preferences: Option<Arc<dyn PreferencesStore>>,

    notify_tx: NotificationSender,

    event_tx: mpsc::UnboundedSender<PlaybackEvent>,

    /// The one submission whose notifications are honoured.
    in_flight: Option<InFlight>,

    /// Submission whose cancellation was requested but not yet confirmed.
    cancelled: Option<UtteranceTag>,

    /// Chunk to continue from when resuming.
    resume_point: Option<usize>,

    scheduled: Option<Scheduled>,

    /// Bumped whenever scheduled work is superseded.
    generation: u64,

    next_serial: u64,
}

impl Sequencer {
    /// Create an idle sequencer.
    ///
    /// Returns the sequencer and the receivers for its events and for the
    /// engine's notifications.
    pub fn new(
        settings: SpeechSettings,
        engine: Box<dyn SpeechEngine>,
        highlighter: Box<dyn HighlightRenderer>,
    ) -> Result<(Self, SequencerChannels), SpeechError> {
        validate_settings(&settings)?;

        let (event_tx, events) = mpsc::unbounded_channel();
        let (notify_tx, notifications) = notification_channel();

        let sequencer = Self {
            settings,
            text: String::new(),
            state: PlaybackState::default(),
            engine,
            highlighter,
            preferences: None,
            notify_tx,
            event_tx,
            in_flight: None,
            cancelled: None,
            resume_point: None,
            scheduled: None,
            generation: 0,
            next_serial: 0,
        };

        Ok((
            sequencer,
            SequencerChannels {
                events,
                notifications,
            },
        ))
    }

    /// Load voice and rate from `store` and persist later changes to it.
    #[must_use]
    pub fn with_preferences(mut self, store: Arc<dyn PreferencesStore>) -> Self {
        SpeechPreferences::load(store.as_ref(), &self.settings).apply_to(&mut self.settings);
        self.preferences = Some(store);
        self
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub const fn activity(&self) -> PlaybackActivity {
        self.state.activity
    }

    pub const fn current_index(&self) -> usize {
        self.state.current_index
    }

    /// Chunks of the current session (empty before the first play).
    pub fn chunks(&self) -> &[String] {
        &self.state.chunks
    }

    pub const fn settings(&self) -> &SpeechSettings {
        &self.settings
    }

    /// Point-in-time view of the playback state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            activity: self.state.activity,
            current_index: self.state.current_index,
            chunk_count: self.state.chunks.len(),
            highlighted_index: self.state.highlighted_index,
            retry_count: self.state.retry_count,
            pending_cancel: self.state.pending_cancel,
            voice: self.settings.voice.clone(),
            rate_percent: self.settings.rate_percent,
        }
    }

    /// The step waiting to be fired, if any.
    pub const fn scheduled(&self) -> Option<Scheduled> {
        self.scheduled
    }

    /// Hand the pending step to the driver.
    pub const fn take_scheduled(&mut self) -> Option<Scheduled> {
        self.scheduled.take()
    }

    // ── Document ───────────────────────────────────────────────────

    /// Replace the text to read. Stops any playback in progress.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.state.activity.is_active() {
            self.stop();
        }
        self.text = text.into();
        self.state.chunks.clear();
    }

    // ── Playback controls ──────────────────────────────────────────

    /// Start reading from chunk `from`.
    ///
    /// An out-of-range start index falls back to the first chunk. While a
    /// session is already active this behaves like [`seek`](Self::seek).
    pub fn play(&mut self, from: usize) {
        if self.state.activity.is_active() {
            self.seek(from);
            return;
        }

        if !self.ensure_chunks() {
            tracing::info!("Play requested with nothing to read");
            self.emit(PlaybackEvent::Notice(PlaybackNotice::NothingToRead));
            return;
        }

        let count = self.state.chunks.len();
        let index = if from < count {
            from
        } else {
            tracing::warn!(from, count, "Start index out of range, reading from the top");
            0
        };

        tracing::info!(index, count, "Starting playback");
        self.state.current_index = index;
        self.state.retry_count = 0;
        self.resume_point = None;
        self.set_activity(PlaybackActivity::Speaking);
        self.dispatch(index, self.settings.cancel_settle());
    }

    /// Pause at the current chunk. Only meaningful while speaking.
    pub fn pause(&mut self) {
        if self.state.activity != PlaybackActivity::Speaking {
            tracing::debug!(state = %self.state.activity, "Pause ignored");
            return;
        }

        // A submission waiting on its settling delay must not go out
        self.supersede_scheduled();
        self.resume_point = Some(self.state.current_index);

        if self.in_flight.is_some() {
            self.engine.pause_current();
        }

        tracing::debug!(index = self.state.current_index, "Paused");
        self.set_activity(PlaybackActivity::Paused);
        self.schedule(Step::ConfirmPause, self.settings.pause_settle());
    }

    /// Continue from the resume point.
    ///
    /// Asks the engine to resume when it reports itself paused; otherwise
    /// the chunk at the resume point is submitted again from its start.
    /// From idle this starts playback at the first chunk.
    pub fn resume(&mut self) {
        match self.state.activity {
            PlaybackActivity::Idle => {
                self.play(0);
                return;
            }
            PlaybackActivity::Paused => {}
            PlaybackActivity::Speaking | PlaybackActivity::Stopping => {
                tracing::debug!(state = %self.state.activity, "Resume ignored");
                return;
            }
        }

        let index = self.resume_point.take().unwrap_or(self.state.current_index);
        self.state.current_index = index;
        self.supersede_scheduled();
        self.set_activity(PlaybackActivity::Speaking);

        if self.in_flight.is_some() && self.engine.is_paused() {
            tracing::debug!(index, "Resuming paused utterance");
            self.engine.resume_current();
            return;
        }

        tracing::info!(index, "Engine holds no paused utterance, resubmitting chunk");
        if self.in_flight.is_some() {
            self.halt_engine();
        }
        self.state.retry_count = 0;
        self.dispatch(index, self.settings.cancel_settle());
    }

    /// Stop playback and return to idle. Safe to call in any state.
    pub fn stop(&mut self) {
        if !self.state.activity.is_active() && self.in_flight.is_none() {
            // The engine may be busy, but not with anything of ours
            tracing::debug!("Stop ignored while idle");
            return;
        }

        if self.state.activity.is_active() {
            tracing::info!(index = self.state.current_index, "Stopping playback");
            self.set_activity(PlaybackActivity::Stopping);
        }

        self.halt_engine();
        self.reset_session();
        self.set_activity(PlaybackActivity::Idle);
    }

    /// Jump to chunk `to` while a session is active.
    pub fn seek(&mut self, to: usize) {
        if !self.state.activity.is_active() {
            tracing::debug!(to, "Seek ignored while idle");
            return;
        }

        let count = self.state.chunks.len();
        if to >= count {
            tracing::warn!(to, count, "Seek target out of range");
            return;
        }

        tracing::debug!(from = self.state.current_index, to, "Seeking");
        self.halt_engine();
        self.set_highlight(None);
        self.state.retry_count = 0;
        self.resume_point = None;
        self.state.current_index = to;
        self.set_activity(PlaybackActivity::Speaking);
        self.schedule(Step::Submit { index: to }, self.settings.cancel_settle());
    }

    /// Skip to the next chunk, or stop when already at the last one.
    pub fn seek_next(&mut self) {
        if !self.state.activity.is_active() {
            return;
        }
        if self.state.is_last(self.state.current_index) {
            self.stop();
        } else {
            self.seek(self.state.current_index + 1);
        }
    }

    /// Go back one chunk. Does nothing at the first chunk or while idle.
    pub fn seek_previous(&mut self) {
        if !self.state.activity.is_active() || self.state.current_index == 0 {
            return;
        }
        self.seek(self.state.current_index - 1);
    }

    // ── Voice and rate ─────────────────────────────────────────────

    /// Voices offered by the engine.
    pub fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.engine.list_voices()
    }

    /// Choose the voice for subsequent chunks and remember the choice.
    pub fn set_voice(&mut self, voice: impl Into<String>) -> Result<(), SpeechError> {
        let voice = voice.into().trim().to_string();
        let voices = self.engine.list_voices();
        if voice.is_empty() || (!voices.is_empty() && !voices.iter().any(|v| v.id == voice)) {
            return Err(SpeechError::UnknownVoice(voice));
        }

        tracing::debug!(voice = %voice, "Voice changed");
        if let Some(store) = &self.preferences {
            if let Err(e) = SpeechPreferences::store_voice(store.as_ref(), &voice) {
                tracing::warn!(error = %e, "Failed to persist voice preference");
            }
        }
        self.settings.voice = Some(voice);
        Ok(())
    }

    /// Change the playback rate, given in percent and clamped to the
    /// accepted range. Returns the rate actually applied.
    pub fn set_rate(&mut self, percent: u32) -> u16 {
        let rate_percent = clamp_rate_percent(percent);
        if u32::from(rate_percent) != percent {
            tracing::debug!(requested = percent, applied = rate_percent, "Rate clamped");
        }
        if rate_percent == self.settings.rate_percent {
            return rate_percent;
        }

        self.settings.rate_percent = rate_percent;
        if let Some(store) = &self.preferences {
            if let Err(e) = SpeechPreferences::store_rate(store.as_ref(), rate_percent) {
                tracing::warn!(error = %e, "Failed to persist rate preference");
            }
        }

        if self.in_flight.is_some() && self.engine.set_rate_current(self.settings.rate()) {
            tracing::debug!(rate_percent, "Rate applied to current utterance");
        } else {
            tracing::debug!(rate_percent, "Rate applies from the next chunk");
        }
        rate_percent
    }

    /// Tear down: stop playback and forget the document.
    pub fn close(&mut self) {
        self.stop();
        self.text.clear();
    }

    // ── Driver inputs ──────────────────────────────────────────────

    /// Apply an engine notification.
    pub fn handle_notification(&mut self, notification: EngineNotification) {
        let EngineNotification { tag, signal } = notification;

        let Some(flight) = self.in_flight.filter(|f| f.tag == tag) else {
            self.discard(tag, &signal);
            return;
        };

        match signal {
            EngineSignal::Started => self.on_started(flight),
            EngineSignal::Ended => self.on_ended(flight),
            EngineSignal::Failed(failure) => self.on_failed(flight, failure),
        }
    }

    /// Run a step previously handed out by [`take_scheduled`](Self::take_scheduled).
    pub fn fire(&mut self, scheduled: Scheduled) {
        if scheduled.generation != self.generation {
            tracing::debug!(step = ?scheduled.step, "Discarding superseded step");
            return;
        }
        if self.scheduled == Some(scheduled) {
            self.scheduled = None;
        }

        match scheduled.step {
            Step::Submit { index } => {
                if self.state.activity != PlaybackActivity::Speaking
                    || index != self.state.current_index
                {
                    tracing::debug!(index, state = %self.state.activity, "Submission no longer wanted");
                    return;
                }
                if self.in_flight.is_some() {
                    tracing::debug!(index, "Submission already outstanding");
                    return;
                }
                self.submit(index);
            }
            Step::ConfirmPause => {
                if self.state.activity == PlaybackActivity::Paused
                    && self.in_flight.is_some()
                    && self.engine.is_busy()
                    && !self.engine.is_paused()
                {
                    tracing::warn!(index = self.state.current_index, "Engine ignored pause, asking again");
                    self.engine.pause_current();
                }
            }
        }
    }

    // ── Notification handling ──────────────────────────────────────

    fn discard(&mut self, tag: UtteranceTag, signal: &EngineSignal) {
        if self.cancelled == Some(tag) && *signal != EngineSignal::Started {
            tracing::debug!(serial = tag.serial, index = tag.index, "Cancellation confirmed");
            self.cancelled = None;
            self.state.pending_cancel = false;
            return;
        }
        tracing::debug!(serial = tag.serial, index = tag.index, ?signal, "Discarding stale notification");
    }

    fn on_started(&mut self, flight: InFlight) {
        let index = flight.tag.index;
        self.in_flight = Some(InFlight {
            started: true,
            ..flight
        });
        self.state.retry_count = 0;

        tracing::debug!(index, "Chunk started");
        if self.state.activity == PlaybackActivity::Paused && !self.engine.is_paused() {
            // Pause arrived before the engine began speaking
            tracing::debug!(index, "Started while paused, pausing again");
            self.engine.pause_current();
            self.schedule(Step::ConfirmPause, self.settings.pause_settle());
        }
        self.set_highlight(Some(index));
        self.emit(PlaybackEvent::ChunkStarted {
            index,
            total: self.state.chunks.len(),
        });
    }

    fn on_ended(&mut self, flight: InFlight) {
        self.in_flight = None;
        let index = flight.tag.index;
        let is_last = self.state.is_last(index);

        match self.state.activity {
            PlaybackActivity::Speaking => {}
            PlaybackActivity::Paused => {
                // The engine ran on past the pause request
                if flight.started {
                    if is_last {
                        self.finish();
                    } else {
                        self.state.current_index = index + 1;
                        self.resume_point = Some(index + 1);
                    }
                }
                return;
            }
            PlaybackActivity::Idle | PlaybackActivity::Stopping => return,
        }

        if !flight.started && !is_last {
            self.retry_or_give_up(index);
        } else if is_last {
            self.finish();
        } else {
            let next = index + 1;
            tracing::debug!(index, next, "Chunk ended, advancing");
            self.state.current_index = next;
            self.state.retry_count = 0;
            self.schedule(Step::Submit { index: next }, self.settings.advance_settle());
        }
    }

    fn on_failed(&mut self, flight: InFlight, failure: EngineFailure) {
        self.in_flight = None;
        let index = flight.tag.index;

        // Requested cancellations never get here: halt_engine forgets the
        // tag, so their echo is dropped in discard(). This one came from
        // another client taking the engine over.
        if failure.is_cancellation() {
            tracing::info!(index, reason = %failure, "Utterance cancelled by the engine, stopping");
            self.reset_session();
            self.set_activity(PlaybackActivity::Idle);
            return;
        }

        tracing::warn!(index, error = %failure, "Engine reported an error");
        self.fail(PlaybackNotice::Failed(failure));
    }

    fn retry_or_give_up(&mut self, index: usize) {
        self.state.retry_count += 1;
        let attempts = self.state.retry_count;

        if attempts > self.settings.max_retries {
            tracing::warn!(index, attempts, "Chunk never started, giving up");
            self.fail(PlaybackNotice::Interrupted { index, attempts });
            return;
        }

        tracing::warn!(
            index,
            retry = attempts,
            max_retries = self.settings.max_retries,
            "Chunk ended before it started, resubmitting"
        );
        self.schedule(Step::Submit { index }, self.settings.retry_delay());
    }

    // ── Internal helpers ───────────────────────────────────────────

    /// Segment the text if this session has no chunks yet. Returns whether
    /// there is anything to read.
    fn ensure_chunks(&mut self) -> bool {
        if !self.state.chunks.is_empty() {
            return true;
        }

        let chunks = segment(&self.text, self.settings.max_chunk_chars);
        if chunks.is_empty() {
            return false;
        }

        tracing::debug!(count = chunks.len(), max_chars = self.settings.max_chunk_chars, "Segmented text");
        self.highlighter.prepare(&chunks);
        self.emit(PlaybackEvent::ChunksReady {
            count: chunks.len(),
        });
        self.state.chunks = chunks;
        true
    }

    /// Submit now, or after `settle` when the engine has not let go of a
    /// cancelled utterance yet.
    fn dispatch(&mut self, index: usize, settle: Duration) {
        if self.state.pending_cancel || self.engine.is_busy() {
            self.schedule(Step::Submit { index }, settle);
        } else {
            self.submit(index);
        }
    }

    fn submit(&mut self, index: usize) {
        let Some(text) = self.state.chunks.get(index).cloned() else {
            tracing::warn!(index, count = self.state.chunks.len(), "No chunk to submit, stopping");
            self.stop();
            return;
        };

        self.next_serial += 1;
        let tag = UtteranceTag {
            serial: self.next_serial,
            index,
        };
        let request = EngineRequest {
            text,
            voice: self.settings.voice.clone(),
            rate: self.settings.rate(),
            notifier: UtteranceNotifier::new(tag, self.notify_tx.clone()),
        };

        self.state.pending_cancel = false;
        tracing::debug!(index, serial = tag.serial, attempt = self.state.retry_count + 1, "Submitting chunk");

        match self.engine.submit(request) {
            Ok(_) => self.in_flight = Some(InFlight { tag, started: false }),
            Err(failure) => {
                tracing::warn!(index, error = %failure, "Engine rejected chunk");
                self.fail(PlaybackNotice::Failed(failure));
            }
        }
    }

    /// Cancel whatever the engine is doing and drop scheduled work.
    fn halt_engine(&mut self) {
        self.supersede_scheduled();

        let flight = self.in_flight.take();
        if let Some(flight) = flight {
            // Cleared once the engine confirms, or by the next submission
            self.cancelled = Some(flight.tag);
            self.state.pending_cancel = true;
        }
        if flight.is_some() || self.engine.is_busy() {
            tracing::debug!(serial = ?flight.map(|f| f.tag.serial), "Cancelling current utterance");
            self.engine.cancel_current();
        }
    }

    fn finish(&mut self) {
        tracing::info!(count = self.state.chunks.len(), "Finished reading");
        self.reset_session();
        self.set_activity(PlaybackActivity::Idle);
        self.emit(PlaybackEvent::Finished);
    }

    fn fail(&mut self, notice: PlaybackNotice) {
        self.halt_engine();
        self.reset_session();
        self.emit(PlaybackEvent::Notice(notice));
        self.set_activity(PlaybackActivity::Idle);
    }

    /// Forget the session: chunks, cursor, retries, resume point, highlight.
    fn reset_session(&mut self) {
        self.supersede_scheduled();
        self.state.chunks.clear();
        self.state.current_index = 0;
        self.state.retry_count = 0;
        self.resume_point = None;
        self.set_highlight(None);
    }

    fn schedule(&mut self, step: Step, delay: Duration) {
        self.generation += 1;
        self.scheduled = Some(Scheduled {
            step,
            delay,
            generation: self.generation,
        });
    }

    const fn supersede_scheduled(&mut self) {
        self.generation += 1;
        self.scheduled = None;
    }

    fn set_highlight(&mut self, index: Option<usize>) {
        if self.state.highlighted_index != index {
            self.state.highlighted_index = index;
            self.highlighter.set_highlight(index);
        }
    }

    /// Transition to a new activity and emit a state-change event.
    fn set_activity(&mut self, activity: PlaybackActivity) {
        if self.state.activity != activity {
            tracing::debug!(old = %self.state.activity, new = %activity, "Playback state transition");
            self.state.activity = activity;
            self.emit(PlaybackEvent::StateChanged(activity));
        }
    }

    /// Emit a playback event (best-effort, a dropped receiver is not an error).
    fn emit(&self, event: PlaybackEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("Playback event receiver dropped");
        }
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        if self.state.activity.is_active() || self.in_flight.is_some() {
            self.stop();
        }
    }
}
