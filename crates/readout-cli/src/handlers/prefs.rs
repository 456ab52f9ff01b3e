//! Prefs command handler.

use anyhow::Result;
use readout_core::preferences::{RATE_KEY, VOICE_KEY};
use readout_core::{PreferencesStore, SpeechEngine, SpeechPreferences, clamp_rate_percent};
use readout_speech::SimulatedEngine;

use crate::bootstrap::CliContext;
use crate::commands::PrefsCommand;
use crate::error::CliError;

pub fn execute(ctx: &CliContext, command: PrefsCommand) -> Result<()> {
    match command {
        PrefsCommand::Get { key: None } => {
            let entries = ctx.preferences.entries();
            if entries.is_empty() {
                println!("No preferences stored ({}).", ctx.preferences.path().display());
            }
            for (key, value) in entries {
                println!("{key} = {value}");
            }
        }
        PrefsCommand::Get { key: Some(key) } => match ctx.preferences.get(&key) {
            Some(value) => println!("{value}"),
            None => println!("{key} is not set"),
        },
        PrefsCommand::Set { key, value } => {
            let stored = set_preference(ctx.preferences.as_ref(), &key, &value)?;
            println!("✓ {key} = {stored}");
        }
    }
    Ok(())
}

/// Validate and store one preference. Returns the value actually stored.
pub fn set_preference(
    store: &dyn PreferencesStore,
    key: &str,
    value: &str,
) -> Result<String, CliError> {
    match key {
        VOICE_KEY => {
            let voice = value.trim();
            let engine = SimulatedEngine::default();
            if !engine.list_voices().iter().any(|v| v.id == voice) {
                return Err(CliError::Arguments(format!(
                    "unknown voice '{voice}' (see `readout voices`)"
                )));
            }
            SpeechPreferences::store_voice(store, voice)?;
            Ok(voice.to_string())
        }
        RATE_KEY => {
            let percent: u32 = value.trim().parse().map_err(|_| {
                CliError::Arguments(format!("rate must be a whole percentage, got '{value}'"))
            })?;
            let rate = clamp_rate_percent(percent);
            SpeechPreferences::store_rate(store, rate)?;
            Ok(rate.to_string())
        }
        other => Err(CliError::Arguments(format!(
            "unknown preference '{other}' (expected {VOICE_KEY} or {RATE_KEY})"
        ))),
    }
}
