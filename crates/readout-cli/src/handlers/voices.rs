//! Voices command handler.

use anyhow::Result;
use readout_core::{SpeechEngine, SpeechPreferences, VoiceDescriptor};
use readout_speech::SimulatedEngine;

use crate::bootstrap::CliContext;

/// One table row for `voice`, marking the preferred one.
pub fn voice_row(voice: &VoiceDescriptor, preferred: Option<&str>) -> String {
    let mut flags = Vec::new();
    if preferred == Some(voice.id.as_str()) {
        flags.push("preferred");
    }
    if voice.is_default {
        flags.push("default");
    }
    if !voice.is_local {
        flags.push("online");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!("  ({})", flags.join(", "))
    };
    format!("{:<14} {:<16} {}{flags}", voice.id, voice.name, voice.language)
}

pub fn execute(ctx: &CliContext) -> Result<()> {
    let engine = SimulatedEngine::default();
    let prefs = SpeechPreferences::load(ctx.preferences.as_ref(), &ctx.settings);

    for voice in engine.list_voices() {
        println!("{}", voice_row(&voice, prefs.voice.as_deref()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_row_flags() {
        let voice = VoiceDescriptor::local("en-GB-amy", "Amy", "en-GB").as_default();
        let row = voice_row(&voice, Some("en-GB-amy"));
        assert!(row.starts_with("en-GB-amy"));
        assert!(row.ends_with("(preferred, default)"));

        let plain = voice_row(&VoiceDescriptor::local("x", "X", "fr-FR"), None);
        assert!(!plain.contains('('));
    }
}
