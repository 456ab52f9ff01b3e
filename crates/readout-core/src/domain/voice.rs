use serde::{Deserialize, Serialize};

/// A voice offered by a speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDescriptor {
    /// Voice identifier passed back to the engine on submission.
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// BCP 47 language tag (e.g. `"en-GB"`).
    pub language: String,

    /// Whether the engine picks this voice when none is requested.
    pub is_default: bool,

    /// Whether synthesis happens on-device. Remote voices can fail when the
    /// network is unavailable.
    pub is_local: bool,
}

impl VoiceDescriptor {
    /// Convenience constructor for a local voice.
    pub fn local(id: &str, name: &str, language: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            language: language.to_string(),
            is_default: false,
            is_local: true,
        }
    }

    /// Mark this voice as the engine default.
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}
