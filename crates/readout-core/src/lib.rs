#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod preferences;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{PlaybackActivity, PlaybackSnapshot, VoiceDescriptor};
pub use paths::{PathError, data_root, ensure_data_root, env_file_path, preferences_path};
pub use ports::{
    CoreError, EngineFailure, EngineNotification, EngineRequest, EngineSignal, HighlightRenderer,
    NoopHighlighter, NotificationReceiver, NotificationSender, PreferencesError, PreferencesStore,
    SpeechEngine, UtteranceNotifier, UtteranceTag, notification_channel,
};
pub use preferences::{JsonFilePreferences, MemoryPreferences, SpeechPreferences};
pub use settings::{
    DEFAULT_MAX_CHUNK_CHARS, DEFAULT_RATE_PERCENT, MAX_RATE_PERCENT, MIN_RATE_PERCENT,
    SettingsError, SpeechSettings, SpeechSettingsUpdate, clamp_rate_percent, validate_settings,
};
