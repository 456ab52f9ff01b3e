//! Speech settings domain types and validation.
//!
//! `SpeechSettings` carries the user-facing choices (voice, rate) and the
//! tunable constants of the sequencer (chunk bound, retry budget, settling
//! delays). The delay and retry values are tunable, not load-bearing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default playback rate in percent.
pub const DEFAULT_RATE_PERCENT: u16 = 100;

/// Slowest accepted playback rate in percent.
pub const MIN_RATE_PERCENT: u16 = 50;

/// Fastest accepted playback rate in percent.
pub const MAX_RATE_PERCENT: u16 = 200;

/// Default maximum chunk length in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 280;

/// Speech playback settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SpeechSettings {
    /// Preferred voice identifier. `None` uses the engine default.
    pub voice: Option<String>,

    /// Playback rate in percent (50–200).
    pub rate_percent: u16,

    /// Maximum characters per spoken chunk (40–2000).
    pub max_chunk_chars: usize,

    /// Resubmissions allowed for a chunk that ends without starting (0–10).
    pub max_retries: u32,

    /// Delay between a cancellation request and the next submission.
    pub cancel_settle_ms: u64,

    /// Delay between one chunk ending and the next being submitted.
    pub advance_settle_ms: u64,

    /// Delay between a pause request and checking that the engine paused.
    pub pause_settle_ms: u64,

    /// Delay before resubmitting a prematurely ended chunk.
    pub retry_delay_ms: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            voice: None,
            rate_percent: DEFAULT_RATE_PERCENT,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            max_retries: 3,
            cancel_settle_ms: 150,
            advance_settle_ms: 50,
            pause_settle_ms: 100,
            retry_delay_ms: 250,
        }
    }
}

impl SpeechSettings {
    /// Rate multiplier handed to the engine (1.0 = normal speed).
    pub fn rate(&self) -> f32 {
        f32::from(self.rate_percent) / 100.0
    }

    pub const fn cancel_settle(&self) -> Duration {
        Duration::from_millis(self.cancel_settle_ms)
    }

    pub const fn advance_settle(&self) -> Duration {
        Duration::from_millis(self.advance_settle_ms)
    }

    pub const fn pause_settle(&self) -> Duration {
        Duration::from_millis(self.pause_settle_ms)
    }

    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Build settings from defaults plus `READOUT_*` environment overrides.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from defaults plus overrides supplied by `lookup`.
    ///
    /// Recognised keys: `READOUT_VOICE`, `READOUT_RATE_PERCENT`,
    /// `READOUT_MAX_CHUNK_CHARS`, `READOUT_MAX_RETRIES`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Some(voice) = lookup("READOUT_VOICE").filter(|v| !v.trim().is_empty()) {
            settings.voice = Some(voice.trim().to_string());
        }
        if let Some(raw) = lookup("READOUT_RATE_PERCENT") {
            settings.rate_percent = parse_number("READOUT_RATE_PERCENT", &raw)?;
        }
        if let Some(raw) = lookup("READOUT_MAX_CHUNK_CHARS") {
            settings.max_chunk_chars = parse_number("READOUT_MAX_CHUNK_CHARS", &raw)?;
        }
        if let Some(raw) = lookup("READOUT_MAX_RETRIES") {
            settings.max_retries = parse_number("READOUT_MAX_RETRIES", &raw)?;
        }

        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Merge a partial update into these settings, only touching fields that
    /// are `Some`.
    pub fn merge(&mut self, other: &SpeechSettingsUpdate) {
        if let Some(ref voice) = other.voice {
            self.voice.clone_from(voice);
        }
        if let Some(rate) = other.rate_percent {
            self.rate_percent = rate;
        }
        if let Some(max) = other.max_chunk_chars {
            self.max_chunk_chars = max;
        }
        if let Some(retries) = other.max_retries {
            self.max_retries = retries;
        }
    }
}

/// Partial settings update.
///
/// `voice` is `Option<Option<String>>`:
/// - `None` = don't change
/// - `Some(None)` = reset to the engine default
/// - `Some(Some(id))` = use voice `id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechSettingsUpdate {
    pub voice: Option<Option<String>>,
    pub rate_percent: Option<u16>,
    pub max_chunk_chars: Option<usize>,
    pub max_retries: Option<u32>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Rate must be between {MIN_RATE_PERCENT}% and {MAX_RATE_PERCENT}%, got {0}%")]
    InvalidRate(u16),

    #[error("Max chunk length must be between 40 and 2,000 characters, got {0}")]
    InvalidChunkLength(usize),

    #[error("Max retries must be between 0 and 10, got {0}")]
    InvalidRetryLimit(u32),

    #[error("Voice identifier cannot be empty")]
    EmptyVoice,

    #[error("{key} must be a number, got '{value}'")]
    NotANumber { key: &'static str, value: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &SpeechSettings) -> Result<(), SettingsError> {
    if !(MIN_RATE_PERCENT..=MAX_RATE_PERCENT).contains(&settings.rate_percent) {
        return Err(SettingsError::InvalidRate(settings.rate_percent));
    }

    if !(40..=2_000).contains(&settings.max_chunk_chars) {
        return Err(SettingsError::InvalidChunkLength(settings.max_chunk_chars));
    }

    if settings.max_retries > 10 {
        return Err(SettingsError::InvalidRetryLimit(settings.max_retries));
    }

    if settings.voice.as_ref().is_some_and(|v| v.trim().is_empty()) {
        return Err(SettingsError::EmptyVoice);
    }

    Ok(())
}

/// Clamp an arbitrary rate percentage into the accepted range.
pub fn clamp_rate_percent(percent: u32) -> u16 {
    let clamped = percent.clamp(u32::from(MIN_RATE_PERCENT), u32::from(MAX_RATE_PERCENT));
    u16::try_from(clamped).unwrap_or(DEFAULT_RATE_PERCENT)
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, SettingsError> {
    raw.trim().parse().map_err(|_| SettingsError::NotANumber {
        key,
        value: raw.to_string(),
    })
}
