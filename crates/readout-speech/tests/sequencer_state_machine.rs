//! Integration tests for the `Sequencer` state machine.
//!
//! The sequencer is driven by hand: a recording engine captures every
//! request, the test decides when the engine "starts" and "ends" an
//! utterance, and scheduled steps are fired explicitly instead of waiting
//! out their delays.
//!
//! # What is tested
//!
//! - Reading a document start to finish, with highlight tracking
//! - Pause / resume, both engine-assisted and by resubmission
//! - Idempotent stop and stale notification filtering
//! - Seeking, including the no-op and stop-at-end edges
//! - Bounded retries of chunks that end without starting
//! - Error reporting vs. suppressed cancellation errors
//! - Voice and rate changes, persisted through the preferences port

mod common;

use std::sync::Arc;

use common::{Call, Harness, RecordingEngine, states_from};
use mockall::mock;
use mockall::predicate::eq;
use readout_core::{
    EngineFailure, EngineRequest, PlaybackActivity, PreferencesError, PreferencesStore,
    SpeechEngine, SpeechSettings, UtteranceNotifier, UtteranceTag, VoiceDescriptor,
    notification_channel,
};
use readout_speech::{PlaybackEvent, PlaybackNotice, SpeechError, Step};

mock! {
    Preferences {}

    impl PreferencesStore for Preferences {
        fn get(&self, key: &str) -> Option<String>;
        fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError>;
    }
}

fn notices(events: &[PlaybackEvent]) -> Vec<PlaybackNotice> {
    events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::Notice(n) => Some(n.clone()),
            _ => None,
        })
        .collect()
}

// ── Reading ────────────────────────────────────────────────────────

#[test]
fn reads_every_chunk_in_order() {
    let mut h = Harness::new("A. B. C.");
    h.sequencer.play(0);

    assert_eq!(h.sequencer.chunks(), ["A.", "B.", "C."]);
    assert_eq!(h.engine.submitted_indices(), [0]);

    h.start();
    assert_eq!(h.sequencer.snapshot().highlighted_index, Some(0));
    h.end();
    assert_eq!(h.run_timer(), Some(Step::Submit { index: 1 }));
    h.start();
    h.end();
    assert_eq!(h.run_timer(), Some(Step::Submit { index: 2 }));
    h.start();
    h.end();

    assert_eq!(h.engine.submitted_indices(), [0, 1, 2]);
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert_eq!(h.highlights.history(), [Some(0), Some(1), Some(2), None]);
    assert!(h.sequencer.scheduled().is_none());

    let events = h.drain_events();
    assert_eq!(
        states_from(&events),
        [PlaybackActivity::Speaking, PlaybackActivity::Idle]
    );
    assert!(events.contains(&PlaybackEvent::ChunksReady { count: 3 }));
    assert!(events.contains(&PlaybackEvent::ChunkStarted { index: 2, total: 3 }));
    assert_eq!(events.last(), Some(&PlaybackEvent::Finished));
}

#[test]
fn submissions_carry_voice_and_rate() {
    let settings = SpeechSettings {
        voice: Some("en-GB-amy".to_string()),
        rate_percent: 150,
        ..SpeechSettings::default()
    };
    let mut h = Harness::with(
        "Hello there.",
        settings,
        RecordingEngine::with_voices(vec![VoiceDescriptor::local("en-GB-amy", "Amy", "en-GB")]),
    );
    h.sequencer.play(0);

    let request = h.engine.last_request();
    assert_eq!(request.text, "Hello there.");
    assert_eq!(request.voice.as_deref(), Some("en-GB-amy"));
    assert!((request.rate - 1.5).abs() < f32::EPSILON);
}

#[test]
fn nothing_to_read_reports_and_stays_idle() {
    let mut h = Harness::new("   \n\n  ");
    h.sequencer.play(0);

    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert!(h.engine.calls().is_empty());
    assert_eq!(notices(&h.drain_events()), [PlaybackNotice::NothingToRead]);
}

#[test]
fn out_of_range_start_reads_from_the_top() {
    let mut h = Harness::new("One. Two.");
    h.sequencer.play(10);
    assert_eq!(h.sequencer.current_index(), 0);
    assert_eq!(h.engine.submitted_indices(), [0]);
}

#[test]
fn play_from_a_later_chunk() {
    let mut h = Harness::new("One. Two. Three.");
    h.sequencer.play(2);
    h.start();
    assert_eq!(h.sequencer.snapshot().highlighted_index, Some(2));
    h.end();
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
}

// ── Pause / resume ─────────────────────────────────────────────────

#[test]
fn pause_and_resume_through_the_engine() {
    let mut h = Harness::new("One. Two. Three.");
    h.sequencer.play(0);
    h.start();
    h.end();
    h.run_timer();
    h.start();

    h.sequencer.pause();
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Paused);
    assert_eq!(h.sequencer.snapshot().highlighted_index, Some(1));
    assert_eq!(h.run_timer(), Some(Step::ConfirmPause));

    h.sequencer.resume();
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Speaking);
    assert_eq!(h.sequencer.current_index(), 1);
    assert_eq!(
        h.engine.calls(),
        [
            Call::Submit(0),
            Call::Submit(1),
            Call::Pause,
            Call::Resume
        ]
    );
}

#[test]
fn resume_resubmits_when_engine_ignored_pause() {
    let mut h = Harness::with(
        "One. Two. Three.",
        SpeechSettings::default(),
        RecordingEngine::ignoring_pause(),
    );
    h.sequencer.play(0);
    h.start();
    h.end();
    h.run_timer();
    h.start();

    h.sequencer.pause();
    h.sequencer.resume();

    assert!(!h.engine.calls().contains(&Call::Resume));
    assert_eq!(h.engine.calls().last(), Some(&Call::Cancel));
    assert_eq!(h.run_timer(), Some(Step::Submit { index: 1 }));
    assert_eq!(h.engine.submitted_indices(), [0, 1, 1]);

    // The cancelled utterance's error arrives late and is swallowed
    h.engine.notifier_at(1).failed(EngineFailure::Interrupted);
    h.pump();
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Speaking);
    assert!(notices(&h.drain_events()).is_empty());
}

#[test]
fn start_while_paused_pauses_again() {
    let mut h = Harness::with(
        "One. Two.",
        SpeechSettings::default(),
        RecordingEngine::ignoring_pause(),
    );
    h.sequencer.play(0);
    h.sequencer.pause();
    assert_eq!(h.run_timer(), Some(Step::ConfirmPause));
    let pauses_before = h.engine.calls().iter().filter(|c| **c == Call::Pause).count();

    h.start();

    assert_eq!(h.sequencer.activity(), PlaybackActivity::Paused);
    assert_eq!(h.engine.calls().last(), Some(&Call::Pause));
    let pauses = h.engine.calls().iter().filter(|c| **c == Call::Pause).count();
    assert_eq!(pauses, pauses_before + 1);
    assert_eq!(h.sequencer.scheduled().map(|s| s.step), Some(Step::ConfirmPause));
}

#[test]
fn confirm_pause_asks_again_when_engine_keeps_speaking() {
    let mut h = Harness::with(
        "One. Two.",
        SpeechSettings::default(),
        RecordingEngine::ignoring_pause(),
    );
    h.sequencer.play(0);
    h.start();
    h.sequencer.pause();
    assert_eq!(h.run_timer(), Some(Step::ConfirmPause));

    let pauses = h.engine.calls().iter().filter(|c| **c == Call::Pause).count();
    assert_eq!(pauses, 2);
}

#[test]
fn pause_during_settle_drops_pending_submission() {
    let mut h = Harness::new("One. Two. Three.");
    h.sequencer.play(0);
    h.start();
    h.end();
    assert!(matches!(h.sequencer.scheduled().map(|s| s.step), Some(Step::Submit { index: 1 })));

    h.sequencer.pause();
    assert_eq!(h.sequencer.scheduled().map(|s| s.step), Some(Step::ConfirmPause));
    assert_eq!(h.engine.submitted_indices(), [0]);

    h.sequencer.resume();
    assert_eq!(h.engine.submitted_indices(), [0, 1]);
}

#[test]
fn end_while_paused_moves_the_resume_point() {
    let mut h = Harness::with(
        "One. Two. Three.",
        SpeechSettings::default(),
        RecordingEngine::ignoring_pause(),
    );
    h.sequencer.play(0);
    h.start();
    h.sequencer.pause();
    h.end();

    assert_eq!(h.sequencer.activity(), PlaybackActivity::Paused);
    h.sequencer.resume();
    assert_eq!(h.sequencer.current_index(), 1);
    assert_eq!(h.engine.submitted_indices(), [0, 1]);
}

#[test]
fn resume_from_idle_starts_at_the_top() {
    let mut h = Harness::new("One. Two.");
    h.sequencer.resume();
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Speaking);
    assert_eq!(h.engine.submitted_indices(), [0]);
}

#[test]
fn pause_while_idle_is_ignored() {
    let mut h = Harness::new("One.");
    h.sequencer.pause();
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert!(h.drain_events().is_empty());
}

// ── Stop ───────────────────────────────────────────────────────────

#[test]
fn stop_is_idempotent() {
    let mut h = Harness::new("One. Two. Three.");
    h.sequencer.play(0);
    h.start();

    h.sequencer.stop();
    h.sequencer.stop();

    let snapshot = h.sequencer.snapshot();
    assert_eq!(snapshot.activity, PlaybackActivity::Idle);
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.highlighted_index, None);
    assert_eq!(snapshot.chunk_count, 0);
    assert_eq!(h.engine.calls(), [Call::Submit(0), Call::Cancel]);
    assert_eq!(
        states_from(&h.drain_events()),
        [
            PlaybackActivity::Speaking,
            PlaybackActivity::Stopping,
            PlaybackActivity::Idle
        ]
    );
}

#[test]
fn stop_while_idle_changes_nothing() {
    let mut h = Harness::new("One.");
    h.sequencer.stop();
    assert!(h.drain_events().is_empty());
    assert!(h.engine.calls().is_empty());
}

#[test]
fn stop_while_idle_leaves_another_clients_utterance_alone() {
    let mut h = Harness::new("One.");
    let (tx, _rx) = notification_channel();
    let mut engine = h.engine.clone();
    engine
        .submit(EngineRequest {
            text: "Someone else.".to_string(),
            voice: None,
            rate: 1.0,
            notifier: UtteranceNotifier::new(UtteranceTag { serial: 99, index: 0 }, tx),
        })
        .unwrap();

    h.sequencer.stop();
    h.sequencer.stop();

    assert!(!h.engine.calls().contains(&Call::Cancel));
    assert!(h.engine.outstanding().is_some());
    assert!(!h.sequencer.snapshot().pending_cancel);
    assert!(h.drain_events().is_empty());
}

#[test]
fn stale_notifications_after_stop_are_ignored() {
    let mut h = Harness::new("One. Two.");
    h.sequencer.play(0);
    let old = h.engine.notifier_at(0);
    h.sequencer.stop();
    h.drain_events();

    old.started();
    old.ended();
    h.pump();

    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert_eq!(h.highlights.history(), Vec::<Option<usize>>::new());
    assert!(h.sequencer.scheduled().is_none());
    assert_eq!(h.engine.submitted_indices(), [0]);
    assert!(h.drain_events().is_empty());
}

#[test]
fn dropping_the_sequencer_cancels_speech() {
    let engine = RecordingEngine::new();
    let h = Harness::with("One. Two.", SpeechSettings::default(), engine.clone());
    let Harness { mut sequencer, .. } = h;
    sequencer.play(0);
    drop(sequencer);
    assert_eq!(engine.calls().last(), Some(&Call::Cancel));
}

// ── Seeking ────────────────────────────────────────────────────────

#[test]
fn seek_next_submits_the_following_chunk() {
    let mut h = Harness::new("One. Two. Three.");
    h.sequencer.play(0);
    h.start();

    h.sequencer.seek_next();
    assert_eq!(h.sequencer.current_index(), 1);
    assert_eq!(h.sequencer.snapshot().highlighted_index, None);
    assert_eq!(h.run_timer(), Some(Step::Submit { index: 1 }));
    assert_eq!(h.engine.calls(), [Call::Submit(0), Call::Cancel, Call::Submit(1)]);
}

#[test]
fn seek_next_on_last_chunk_stops() {
    let mut h = Harness::new("One. Two. Three.");
    h.sequencer.play(2);
    h.start();
    h.sequencer.seek_next();
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert_eq!(h.sequencer.snapshot().highlighted_index, None);
}

#[test]
fn seek_previous_at_first_chunk_is_a_no_op() {
    let mut h = Harness::new("One. Two.");
    h.sequencer.play(0);
    h.start();
    h.drain_events();
    let calls = h.engine.calls();
    let snapshot = h.sequencer.snapshot();

    h.sequencer.seek_previous();

    assert_eq!(h.engine.calls(), calls);
    assert_eq!(h.sequencer.snapshot(), snapshot);
    assert!(h.drain_events().is_empty());
}

#[test]
fn late_end_after_seek_does_not_advance() {
    let mut h = Harness::new("One. Two. Three. Four.");
    h.sequencer.play(0);
    h.start();
    let old = h.engine.notifier_at(0);

    h.sequencer.seek(3);
    old.ended();
    h.pump();

    assert_eq!(h.sequencer.current_index(), 3);
    assert!(!h.sequencer.snapshot().pending_cancel);
    assert_eq!(h.run_timer(), Some(Step::Submit { index: 3 }));
    h.start();
    assert_eq!(h.sequencer.snapshot().highlighted_index, Some(3));
    assert_eq!(h.engine.submitted_indices(), [0, 3]);
}

#[test]
fn repeated_seeks_only_submit_the_last_target() {
    let mut h = Harness::new("One. Two. Three. Four.");
    h.sequencer.play(0);
    h.start();

    h.sequencer.seek_next();
    let superseded = h.sequencer.take_scheduled().unwrap();
    h.sequencer.seek_next();
    h.sequencer.seek_next();

    h.sequencer.fire(superseded);
    assert_eq!(h.run_timer(), Some(Step::Submit { index: 3 }));
    assert_eq!(h.engine.submitted_indices(), [0, 3]);
}

#[test]
fn play_while_speaking_seeks() {
    let mut h = Harness::new("One. Two. Three.");
    h.sequencer.play(0);
    h.start();
    h.sequencer.play(2);
    assert_eq!(h.run_timer(), Some(Step::Submit { index: 2 }));
    assert_eq!(h.engine.submitted_indices(), [0, 2]);
}

// ── Retries and errors ─────────────────────────────────────────────

#[test]
fn premature_end_is_retried_up_to_the_limit() {
    let settings = SpeechSettings {
        max_retries: 2,
        ..SpeechSettings::default()
    };
    let mut h = Harness::with("One. Two.", settings, RecordingEngine::new());
    h.sequencer.play(0);

    for _ in 0..2 {
        h.end();
        assert_eq!(h.run_timer(), Some(Step::Submit { index: 0 }));
    }
    h.end();

    assert_eq!(h.engine.submitted_indices(), [0, 0, 0]);
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert!(h.sequencer.scheduled().is_none());
    assert_eq!(
        notices(&h.drain_events()),
        [PlaybackNotice::Interrupted {
            index: 0,
            attempts: 3
        }]
    );
}

#[test]
fn confirmed_start_resets_the_retry_budget() {
    let settings = SpeechSettings {
        max_retries: 1,
        ..SpeechSettings::default()
    };
    let mut h = Harness::with("One. Two. Three.", settings, RecordingEngine::new());
    h.sequencer.play(0);

    h.end();
    assert_eq!(h.sequencer.snapshot().retry_count, 1);
    h.run_timer();
    h.start();
    assert_eq!(h.sequencer.snapshot().retry_count, 0);
    h.end();
    h.run_timer();

    h.end();
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Speaking);
    assert_eq!(h.run_timer(), Some(Step::Submit { index: 1 }));
}

#[test]
fn premature_end_of_last_chunk_finishes() {
    let mut h = Harness::new("Only one.");
    h.sequencer.play(0);
    h.end();
    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert_eq!(h.drain_events().last(), Some(&PlaybackEvent::Finished));
}

#[test]
fn genuine_error_stops_with_a_notice() {
    let mut h = Harness::new("One. Two.");
    h.sequencer.play(0);
    h.start();
    h.engine.fail(EngineFailure::AudioBusy);
    h.pump();

    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert_eq!(h.sequencer.snapshot().highlighted_index, None);
    assert!(h.sequencer.scheduled().is_none());
    assert_eq!(h.engine.submitted_indices(), [0]);
    assert_eq!(
        notices(&h.drain_events()),
        [PlaybackNotice::Failed(EngineFailure::AudioBusy)]
    );
}

#[test]
fn cancellation_errors_are_not_reported() {
    let mut h = Harness::new("One. Two.");
    h.sequencer.play(0);
    h.start();
    h.engine.fail(EngineFailure::Interrupted);
    h.pump();

    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert!(notices(&h.drain_events()).is_empty());
}

#[test]
fn cancellation_echo_after_seek_keeps_playing() {
    let mut h = Harness::new("One. Two. Three.");
    h.sequencer.play(0);
    h.start();
    let old = h.engine.notifier_at(0);

    h.sequencer.seek(2);
    assert!(h.sequencer.snapshot().pending_cancel);
    old.failed(EngineFailure::Canceled);
    h.pump();

    assert_eq!(h.sequencer.activity(), PlaybackActivity::Speaking);
    assert!(!h.sequencer.snapshot().pending_cancel);
    assert!(notices(&h.drain_events()).is_empty());
    assert_eq!(h.run_timer(), Some(Step::Submit { index: 2 }));
}

#[test]
fn rejected_submission_fails_playback() {
    let engine = RecordingEngine::new();
    engine.reject_next(EngineFailure::VoiceUnavailable("en-XX".to_string()));
    let mut h = Harness::with("One.", SpeechSettings::default(), engine);
    h.sequencer.play(0);

    assert_eq!(h.sequencer.activity(), PlaybackActivity::Idle);
    assert_eq!(
        notices(&h.drain_events()),
        [PlaybackNotice::Failed(EngineFailure::VoiceUnavailable(
            "en-XX".to_string()
        ))]
    );
}

// ── Voice and rate ─────────────────────────────────────────────────

#[test]
fn rate_is_clamped_and_applies_to_the_next_chunk() {
    let mut h = Harness::new("One. Two.");
    h.sequencer.play(0);
    h.start();

    assert_eq!(h.sequencer.set_rate(300), 200);
    assert!((h.engine.last_request().rate - 1.0).abs() < f32::EPSILON);

    h.end();
    h.run_timer();
    assert!((h.engine.last_request().rate - 2.0).abs() < f32::EPSILON);
    assert_eq!(h.sequencer.snapshot().rate_percent, 200);
}

#[test]
fn voice_choice_is_persisted_and_used() {
    let mut prefs = MockPreferences::new();
    prefs.expect_get().returning(|_| None);
    prefs
        .expect_set()
        .with(eq("tts.voice"), eq("en-US-joe"))
        .times(1)
        .returning(|_, _| Ok(()));

    let engine = RecordingEngine::with_voices(vec![
        VoiceDescriptor::local("en-GB-amy", "Amy", "en-GB").as_default(),
        VoiceDescriptor::local("en-US-joe", "Joe", "en-US"),
    ]);
    let mut h = Harness::with("Hello.", SpeechSettings::default(), engine);
    h.sequencer = h.sequencer.with_preferences(Arc::new(prefs));

    h.sequencer.set_voice("en-US-joe").unwrap();
    let err = h.sequencer.set_voice("xx-nobody").unwrap_err();
    assert!(matches!(err, SpeechError::UnknownVoice(ref v) if v == "xx-nobody"));

    h.sequencer.play(0);
    assert_eq!(h.engine.last_request().voice.as_deref(), Some("en-US-joe"));
}

#[test]
fn stored_preferences_are_loaded() {
    let mut prefs = MockPreferences::new();
    prefs
        .expect_get()
        .with(eq("tts.voice"))
        .returning(|_| Some("en-GB-amy".to_string()));
    prefs
        .expect_get()
        .with(eq("tts.rate"))
        .returning(|_| Some("80".to_string()));

    let h = Harness::new("Hello.");
    let sequencer = h.sequencer.with_preferences(Arc::new(prefs));
    let snapshot = sequencer.snapshot();
    assert_eq!(snapshot.voice.as_deref(), Some("en-GB-amy"));
    assert_eq!(snapshot.rate_percent, 80);
}
