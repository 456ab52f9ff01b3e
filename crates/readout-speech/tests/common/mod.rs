//! Shared fixtures for the sequencer integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use readout_core::{
    EngineFailure, EngineRequest, HighlightRenderer, NotificationReceiver, PlaybackActivity,
    SpeechEngine, SpeechSettings, UtteranceNotifier, UtteranceTag, VoiceDescriptor,
};
use readout_speech::{PlaybackEvent, Sequencer, Step};
use tokio::sync::mpsc::UnboundedReceiver;

// ── Recording engine ───────────────────────────────────────────────

/// Engine call, in the order the sequencer made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Submit(usize),
    Pause,
    Resume,
    Cancel,
}

#[derive(Default)]
struct Recorded {
    calls: Vec<Call>,
    requests: Vec<EngineRequest>,
    outstanding: Option<UtteranceTag>,
    paused: bool,
    honours_pause: bool,
    reject_next: Option<EngineFailure>,
    voices: Vec<VoiceDescriptor>,
}

/// Engine that records every call and only "speaks" when the test says so.
///
/// Panics on a submission while another one is outstanding.
#[derive(Clone)]
pub struct RecordingEngine(Arc<Mutex<Recorded>>);

impl RecordingEngine {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Recorded {
            honours_pause: true,
            ..Recorded::default()
        })))
    }

    /// An engine whose pause requests never take effect.
    pub fn ignoring_pause() -> Self {
        let engine = Self::new();
        engine.lock().honours_pause = false;
        engine
    }

    pub fn with_voices(voices: Vec<VoiceDescriptor>) -> Self {
        let engine = Self::new();
        engine.lock().voices = voices;
        engine
    }

    /// Reject the next submission synchronously.
    pub fn reject_next(&self, failure: EngineFailure) {
        self.lock().reject_next = Some(failure);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn submitted_indices(&self) -> Vec<usize> {
        self.lock().requests.iter().map(|r| r.tag().index).collect()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Tag of the submission the engine currently holds.
    pub fn outstanding(&self) -> Option<UtteranceTag> {
        self.lock().outstanding
    }

    pub fn last_request(&self) -> EngineRequest {
        self.lock().requests.last().cloned().expect("no submissions yet")
    }

    /// Notifier of the `n`th submission (zero-based).
    pub fn notifier_at(&self, n: usize) -> UtteranceNotifier {
        self.lock().requests[n].notifier.clone()
    }

    /// Report `start` for the latest submission.
    pub fn start(&self) {
        self.last_request().notifier.started();
    }

    /// Report `end` for the latest submission.
    pub fn end(&self) {
        let request = self.last_request();
        self.release(request.tag());
        request.notifier.ended();
    }

    /// Report an error for the latest submission.
    pub fn fail(&self, failure: EngineFailure) {
        let request = self.last_request();
        self.release(request.tag());
        request.notifier.failed(failure);
    }

    fn release(&self, tag: UtteranceTag) {
        let mut recorded = self.lock();
        if recorded.outstanding == Some(tag) {
            recorded.outstanding = None;
            recorded.paused = false;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.0.lock().unwrap()
    }
}

impl SpeechEngine for RecordingEngine {
    fn submit(&mut self, request: EngineRequest) -> Result<UtteranceTag, EngineFailure> {
        let mut recorded = self.lock();
        assert!(
            recorded.outstanding.is_none(),
            "double submission: {:?} while {:?} is outstanding",
            request.tag(),
            recorded.outstanding
        );
        if let Some(failure) = recorded.reject_next.take() {
            return Err(failure);
        }

        let tag = request.tag();
        recorded.outstanding = Some(tag);
        recorded.paused = false;
        recorded.calls.push(Call::Submit(tag.index));
        recorded.requests.push(request);
        Ok(tag)
    }

    fn pause_current(&mut self) {
        let mut recorded = self.lock();
        recorded.calls.push(Call::Pause);
        if recorded.honours_pause && recorded.outstanding.is_some() {
            recorded.paused = true;
        }
    }

    fn resume_current(&mut self) {
        let mut recorded = self.lock();
        recorded.calls.push(Call::Resume);
        recorded.paused = false;
    }

    fn cancel_current(&mut self) {
        let mut recorded = self.lock();
        recorded.calls.push(Call::Cancel);
        recorded.outstanding = None;
        recorded.paused = false;
    }

    fn is_busy(&self) -> bool {
        self.lock().outstanding.is_some()
    }

    fn is_paused(&self) -> bool {
        self.lock().paused
    }

    fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.lock().voices.clone()
    }
}

// ── Recording highlighter ──────────────────────────────────────────

/// Highlighter that records every request it receives.
#[derive(Clone, Default)]
pub struct RecordingHighlighter(Arc<Mutex<Vec<Option<usize>>>>);

impl RecordingHighlighter {
    pub fn history(&self) -> Vec<Option<usize>> {
        self.0.lock().unwrap().clone()
    }
}

impl HighlightRenderer for RecordingHighlighter {
    fn set_highlight(&mut self, index: Option<usize>) {
        self.0.lock().unwrap().push(index);
    }
}

// ── Harness ────────────────────────────────────────────────────────

/// A sequencer wired to recording doubles, driven step by step.
pub struct Harness {
    pub sequencer: Sequencer,
    pub engine: RecordingEngine,
    pub highlights: RecordingHighlighter,
    pub events: UnboundedReceiver<PlaybackEvent>,
    pub notifications: NotificationReceiver,
}

impl Harness {
    pub fn new(text: &str) -> Self {
        Self::with(text, SpeechSettings::default(), RecordingEngine::new())
    }

    pub fn with(text: &str, settings: SpeechSettings, engine: RecordingEngine) -> Self {
        let highlights = RecordingHighlighter::default();
        let (mut sequencer, channels) = Sequencer::new(
            settings,
            Box::new(engine.clone()),
            Box::new(highlights.clone()),
        )
        .unwrap();
        sequencer.set_text(text);

        Self {
            sequencer,
            engine,
            highlights,
            events: channels.events,
            notifications: channels.notifications,
        }
    }

    /// Deliver every queued engine notification.
    pub fn pump(&mut self) {
        while let Ok(notification) = self.notifications.try_recv() {
            self.sequencer.handle_notification(notification);
        }
    }

    /// Fire the pending step as the driver would once its delay elapsed.
    pub fn run_timer(&mut self) -> Option<Step> {
        let scheduled = self.sequencer.take_scheduled()?;
        self.sequencer.fire(scheduled);
        Some(scheduled.step)
    }

    pub fn start(&mut self) {
        self.engine.start();
        self.pump();
    }

    pub fn end(&mut self) {
        self.engine.end();
        self.pump();
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(e) = self.events.try_recv() {
            events.push(e);
        }
        events
    }
}

/// Collect only the activity values from `StateChanged` events.
pub fn states_from(events: &[PlaybackEvent]) -> Vec<PlaybackActivity> {
    events
        .iter()
        .filter_map(|e| {
            if let PlaybackEvent::StateChanged(s) = e {
                Some(*s)
            } else {
                None
            }
        })
        .collect()
}
