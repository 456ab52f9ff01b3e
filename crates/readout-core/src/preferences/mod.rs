//! Preference store implementations and the typed speech view over them.
//!
//! Voice and rate are read once when a display panel is created and written
//! back whenever the user changes them. Nothing else in the speech path
//! touches the store.

mod json_file;
mod memory;

pub use json_file::JsonFilePreferences;
pub use memory::MemoryPreferences;

use crate::ports::{PreferencesError, PreferencesStore};
use crate::settings::{SpeechSettings, clamp_rate_percent};

/// Key holding the preferred voice identifier.
pub const VOICE_KEY: &str = "tts.voice";

/// Key holding the playback rate in percent.
pub const RATE_KEY: &str = "tts.rate";

/// Typed view of the speech-related preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechPreferences {
    pub voice: Option<String>,
    pub rate_percent: u16,
}

impl SpeechPreferences {
    /// Read voice and rate from `store`, falling back to `defaults`.
    ///
    /// A stored rate that is not a number is ignored with a warning; an
    /// out-of-range rate is clamped.
    pub fn load(store: &dyn PreferencesStore, defaults: &SpeechSettings) -> Self {
        let voice = store
            .get(VOICE_KEY)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| defaults.voice.clone());

        let rate_percent = match store.get(RATE_KEY) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(percent) => clamp_rate_percent(percent),
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring malformed stored rate");
                    defaults.rate_percent
                }
            },
            None => defaults.rate_percent,
        };

        Self {
            voice,
            rate_percent,
        }
    }

    /// Overlay these preferences on `settings`.
    pub fn apply_to(&self, settings: &mut SpeechSettings) {
        settings.voice.clone_from(&self.voice);
        settings.rate_percent = self.rate_percent;
    }

    /// Persist the voice choice.
    pub fn store_voice(store: &dyn PreferencesStore, voice: &str) -> Result<(), PreferencesError> {
        store.set(VOICE_KEY, voice)
    }

    /// Persist the rate choice.
    pub fn store_rate(
        store: &dyn PreferencesStore,
        rate_percent: u16,
    ) -> Result<(), PreferencesError> {
        store.set(RATE_KEY, &rate_percent.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_empty() {
        let store = MemoryPreferences::new();
        let defaults = SpeechSettings {
            voice: Some("fallback".to_string()),
            ..SpeechSettings::default()
        };
        let prefs = SpeechPreferences::load(&store, &defaults);
        assert_eq!(prefs.voice.as_deref(), Some("fallback"));
        assert_eq!(prefs.rate_percent, defaults.rate_percent);
    }

    #[test]
    fn load_reads_stored_values() {
        let store = MemoryPreferences::new();
        SpeechPreferences::store_voice(&store, "en-US-joe").unwrap();
        SpeechPreferences::store_rate(&store, 140).unwrap();

        let prefs = SpeechPreferences::load(&store, &SpeechSettings::default());
        assert_eq!(prefs.voice.as_deref(), Some("en-US-joe"));
        assert_eq!(prefs.rate_percent, 140);
    }

    #[test]
    fn load_tolerates_bad_rate() {
        let store = MemoryPreferences::new();
        store.set(RATE_KEY, "fast").unwrap();
        let prefs = SpeechPreferences::load(&store, &SpeechSettings::default());
        assert_eq!(prefs.rate_percent, SpeechSettings::default().rate_percent);

        store.set(RATE_KEY, "900").unwrap();
        let prefs = SpeechPreferences::load(&store, &SpeechSettings::default());
        assert_eq!(prefs.rate_percent, crate::settings::MAX_RATE_PERCENT);
    }

    #[test]
    fn apply_overlays_settings() {
        let prefs = SpeechPreferences {
            voice: Some("v".to_string()),
            rate_percent: 80,
        };
        let mut settings = SpeechSettings::default();
        prefs.apply_to(&mut settings);
        assert_eq!(settings.voice.as_deref(), Some("v"));
        assert_eq!(settings.rate_percent, 80);
    }
}
