//! Read command handler.
//!
//! Plays a document through the simulated engine on the controller task and
//! prints each chunk as it is spoken. Playback keys are read line by line
//! from stdin on a plain thread, since a blocking terminal read must not hold
//! up runtime shutdown.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use readout_core::PlaybackActivity;
use readout_speech::{
    PlaybackEvent, PlaybackNotice, Sequencer, SequencerChannels, SimulatedEngine,
    SimulatedEngineConfig, SpanHighlighter, SpeechController, strip_markdown,
};
use tokio::sync::mpsc;

use super::read_input;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments for the read command.
pub struct ReadArgs {
    pub file: PathBuf,
    /// 1-based chunk to start from.
    pub from: usize,
    pub rate: Option<u32>,
    pub voice: Option<String>,
    pub wpm: u32,
    pub flaky: u32,
    pub offline: bool,
    pub json: bool,
}

/// A playback key typed while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Pause,
    Resume,
    Next,
    Previous,
    Stop,
    Quit,
    /// Jump to a chunk (0-based).
    Jump(usize),
}

/// Parse one line of keyboard input.
pub fn parse_key(line: &str) -> Option<Key> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "p" | "pause" => Some(Key::Pause),
        "r" | "resume" => Some(Key::Resume),
        "n" | "next" => Some(Key::Next),
        "b" | "back" => Some(Key::Previous),
        "s" | "stop" => Some(Key::Stop),
        "q" | "quit" => Some(Key::Quit),
        _ => line
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(|n| Key::Jump(n - 1)),
    }
}

pub async fn execute(ctx: &CliContext, args: ReadArgs) -> Result<()> {
    if args.from == 0 {
        return Err(CliError::Arguments("--from counts chunks from 1".to_string()).into());
    }
    let text = strip_markdown(&read_input(&args.file)?);

    let engine = SimulatedEngine::new(SimulatedEngineConfig {
        words_per_minute: args.wpm.max(1),
        flaky_starts: args.flaky,
        offline: args.offline,
        ..SimulatedEngineConfig::default()
    });
    let highlighter = SpanHighlighter::new();
    let (sequencer, channels) = Sequencer::new(
        ctx.settings.clone(),
        Box::new(engine),
        Box::new(highlighter.clone()),
    )
    .map_err(CliError::from)?;
    let sequencer = sequencer.with_preferences(ctx.preferences_store());
    let SequencerChannels {
        mut events,
        notifications,
    } = channels;

    let controller = SpeechController::spawn(sequencer, notifications);
    if let Some(voice) = args.voice {
        controller.set_voice(voice).await.map_err(CliError::from)?;
    }
    if let Some(rate) = args.rate {
        controller.set_rate(rate).map_err(CliError::from)?;
    }
    controller.set_text(text).map_err(CliError::from)?;
    controller.play(args.from - 1).map_err(CliError::from)?;

    if !args.json {
        eprintln!("Keys: p pause, r resume, n next, b back, s stop, q quit, <number> jump");
    }

    let mut keys = spawn_key_reader();
    let mut keys_open = true;
    let mut failure = None;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if let PlaybackEvent::Notice(
                    notice @ (PlaybackNotice::Failed(_) | PlaybackNotice::Interrupted { .. }),
                ) = &event
                {
                    failure = Some(notice.user_message());
                }
                let done = is_final(&event);
                report(&event, &highlighter, args.json)?;
                if done {
                    // Finish and failure events trail the state change
                    while let Ok(event) = events.try_recv() {
                        report(&event, &highlighter, args.json)?;
                    }
                    break;
                }
            }
            line = keys.recv(), if keys_open => match line {
                Some(line) => match parse_key(&line) {
                    Some(Key::Quit) => break,
                    Some(key) => apply_key(&controller, key)?,
                    None if line.trim().is_empty() => {}
                    None => eprintln!("Unknown key '{}'", line.trim()),
                },
                None => keys_open = false,
            },
        }
    }

    controller.close().await.map_err(CliError::from)?;
    match failure {
        Some(reason) => Err(CliError::Playback(reason).into()),
        None => Ok(()),
    }
}

fn apply_key(controller: &SpeechController, key: Key) -> Result<(), CliError> {
    match key {
        Key::Pause => controller.pause(),
        Key::Resume => controller.resume(),
        Key::Next => controller.next(),
        Key::Previous => controller.previous(),
        Key::Stop => controller.stop(),
        Key::Jump(index) => controller.seek(index),
        Key::Quit => Ok(()),
    }
    .map_err(CliError::from)
}

/// Whether playback is over once `event` has been seen.
const fn is_final(event: &PlaybackEvent) -> bool {
    matches!(
        event,
        PlaybackEvent::StateChanged(PlaybackActivity::Idle)
            | PlaybackEvent::Notice(PlaybackNotice::NothingToRead)
    )
}

fn report(event: &PlaybackEvent, highlighter: &SpanHighlighter, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        PlaybackEvent::ChunkStarted { index, total } => {
            let text = highlighter.span_text(*index).unwrap_or_default();
            println!("[{}/{total}] {text}", index + 1);
        }
        PlaybackEvent::StateChanged(PlaybackActivity::Paused) => {
            println!("(paused, r to resume)");
        }
        PlaybackEvent::Finished => println!("(finished)"),
        PlaybackEvent::Notice(notice) => eprintln!("{}", notice.user_message()),
        PlaybackEvent::ChunksReady { count } => {
            tracing::debug!(count, "Chunks ready");
        }
        PlaybackEvent::StateChanged(_) => {}
    }
    Ok(())
}

fn spawn_key_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
