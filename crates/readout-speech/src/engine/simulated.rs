//! Simulated speech engine.
//!
//! Speaks nothing; instead each utterance is a tokio task that waits out a
//! start latency and then a speaking time derived from the word count and
//! rate, reporting `start` and `end` through the submission's notifier.
//! Pause and cancel requests reach the task over a watch channel.
//!
//! The engine can be told to misbehave the way real engines do: the first
//! few submissions can end without ever starting, and network voices can
//! fail while offline.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use readout_core::{
    EngineFailure, EngineRequest, SpeechEngine, UtteranceNotifier, UtteranceTag, VoiceDescriptor,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;

/// Configuration for [`SimulatedEngine`].
#[derive(Debug, Clone)]
pub struct SimulatedEngineConfig {
    /// Speaking speed at rate 1.0.
    pub words_per_minute: u32,

    /// Delay between submission and the `start` notification.
    pub start_latency: Duration,

    /// Number of initial submissions that end without starting.
    pub flaky_starts: u32,

    /// When set, voices that are not local fail with a network error.
    pub offline: bool,

    /// Voices offered by the engine.
    pub voices: Vec<VoiceDescriptor>,
}

impl Default for SimulatedEngineConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 180,
            start_latency: Duration::from_millis(40),
            flaky_starts: 0,
            offline: false,
            voices: default_voices(),
        }
    }
}

/// The voice catalogue of a fresh simulated engine.
pub fn default_voices() -> Vec<VoiceDescriptor> {
    vec![
        VoiceDescriptor::local("en-GB-amy", "Amy", "en-GB").as_default(),
        VoiceDescriptor::local("en-US-joe", "Joe", "en-US"),
        VoiceDescriptor::local("de-DE-greta", "Greta", "de-DE"),
        VoiceDescriptor {
            is_local: false,
            ..VoiceDescriptor::local("en-US-cloud", "Cloud (online)", "en-US")
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Running,
    Paused,
    Cancelled,
}

#[derive(Debug, Default)]
struct EngineState {
    /// Serial of the utterance the engine holds.
    current: Option<u64>,
    paused: bool,
}

/// What one utterance task should do.
#[derive(Debug, Clone, Copy)]
struct Plan {
    start_latency: Duration,
    speaking_time: Duration,
    never_start: bool,
    network_failure: bool,
}

/// Timer-driven [`SpeechEngine`].
///
/// Submissions spawn onto the ambient tokio runtime; submitting outside one
/// is rejected.
#[derive(Debug)]
pub struct SimulatedEngine {
    config: SimulatedEngineConfig,
    state: Arc<Mutex<EngineState>>,
    control: Option<watch::Sender<Control>>,
    submissions: u32,
}

impl SimulatedEngine {
    pub fn new(config: SimulatedEngineConfig) -> Self {
        Self {
            config,
            state: Arc::default(),
            control: None,
            submissions: 0,
        }
    }

    /// Submissions accepted so far.
    pub const fn submissions(&self) -> u32 {
        self.submissions
    }

    /// How long `text` takes to speak at `rate`.
    pub fn speaking_time(&self, text: &str, rate: f32) -> Duration {
        let words = u32::try_from(text.split_whitespace().count().max(1)).unwrap_or(u32::MAX);
        let per_minute = f64::from(self.config.words_per_minute.max(1)) * f64::from(rate.max(0.1));
        Duration::from_secs_f64(f64::from(words) * 60.0 / per_minute)
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        lock(&self.state)
    }

    fn send_control(&self, control: Control) {
        if let Some(tx) = &self.control {
            // The task may already have finished
            let _ = tx.send(control);
        }
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new(SimulatedEngineConfig::default())
    }
}

impl SpeechEngine for SimulatedEngine {
    fn submit(&mut self, request: EngineRequest) -> Result<UtteranceTag, EngineFailure> {
        let Ok(runtime) = Handle::try_current() else {
            return Err(EngineFailure::Synthesis(
                "no async runtime to speak on".to_string(),
            ));
        };

        let remote_voice = match &request.voice {
            Some(id) => {
                let voice = self
                    .config
                    .voices
                    .iter()
                    .find(|v| &v.id == id)
                    .ok_or_else(|| EngineFailure::VoiceUnavailable(id.clone()))?;
                !voice.is_local
            }
            None => false,
        };

        // Single slot: a new utterance cuts off the one before it
        if self.lock().current.is_some() {
            self.cancel_current();
        }

        self.submissions += 1;
        let plan = Plan {
            start_latency: self.config.start_latency,
            speaking_time: self.speaking_time(&request.text, request.rate),
            never_start: self.submissions <= self.config.flaky_starts,
            network_failure: self.config.offline && remote_voice,
        };

        let tag = request.tag();
        let (control_tx, control_rx) = watch::channel(Control::Running);
        {
            let mut state = self.lock();
            state.current = Some(tag.serial);
            state.paused = false;
        }
        self.control = Some(control_tx);

        tracing::trace!(serial = tag.serial, index = tag.index, ?plan, "Simulating utterance");
        runtime.spawn(speak(
            request.notifier,
            plan,
            control_rx,
            Arc::clone(&self.state),
        ));

        Ok(tag)
    }

    fn pause_current(&mut self) {
        let mut state = self.lock();
        if state.current.is_some() && !state.paused {
            state.paused = true;
            drop(state);
            self.send_control(Control::Paused);
        }
    }

    fn resume_current(&mut self) {
        let mut state = self.lock();
        if state.paused {
            state.paused = false;
            drop(state);
            self.send_control(Control::Running);
        }
    }

    fn cancel_current(&mut self) {
        {
            let mut state = self.lock();
            state.current = None;
            state.paused = false;
        }
        self.send_control(Control::Cancelled);
        self.control = None;
    }

    fn is_busy(&self) -> bool {
        self.lock().current.is_some()
    }

    fn is_paused(&self) -> bool {
        self.lock().paused
    }

    fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.config.voices.clone()
    }
}

fn lock(state: &Mutex<EngineState>) -> MutexGuard<'_, EngineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Let go of the slot if `serial` still holds it.
fn release(state: &Mutex<EngineState>, serial: u64) {
    let mut state = lock(state);
    if state.current == Some(serial) {
        state.current = None;
        state.paused = false;
    }
}

async fn speak(
    notifier: UtteranceNotifier,
    plan: Plan,
    mut control: watch::Receiver<Control>,
    state: Arc<Mutex<EngineState>>,
) {
    let serial = notifier.tag().serial;

    if !run_for(plan.start_latency, &mut control).await {
        notifier.failed(EngineFailure::Canceled);
        return;
    }

    if plan.network_failure {
        release(&state, serial);
        notifier.failed(EngineFailure::Network("voice server unreachable".to_string()));
        return;
    }

    if plan.never_start {
        tracing::debug!(serial, "Dropping utterance without starting it");
        release(&state, serial);
        notifier.ended();
        return;
    }

    notifier.started();
    if run_for(plan.speaking_time, &mut control).await {
        release(&state, serial);
        notifier.ended();
    } else {
        notifier.failed(EngineFailure::Canceled);
    }
}

/// Wait for `duration` of unpaused time. Returns `false` if cancelled.
async fn run_for(duration: Duration, control: &mut watch::Receiver<Control>) -> bool {
    let mut remaining = duration;

    loop {
        let current = *control.borrow_and_update();
        match current {
            Control::Cancelled => return false,
            Control::Paused => {
                if control.changed().await.is_err() {
                    return false;
                }
            }
            Control::Running => {
                if remaining.is_zero() {
                    return true;
                }
                let started = Instant::now();
                tokio::select! {
                    () = tokio::time::sleep(remaining) => remaining = Duration::ZERO,
                    changed = control.changed() => {
                        if changed.is_err() {
                            return false;
                        }
                        remaining = remaining.saturating_sub(started.elapsed());
                    }
                }
            }
        }
    }
}
