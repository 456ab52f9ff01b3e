//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces the speech sequencer expects from the host.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - The speech engine is modeled as a single-slot, asynchronous resource:
//!   notifications are index-tagged values sent over a channel, never
//!   closures reading ambient state
//! - Highlighting is keyed by logical chunk index, not by any rendering
//!   technology
//! - Preference storage is synchronous key/value

pub mod highlight;
pub mod preferences;
pub mod speech_engine;

use thiserror::Error;

pub use highlight::{HighlightRenderer, NoopHighlighter};
pub use preferences::{PreferencesError, PreferencesStore};
pub use speech_engine::{
    EngineFailure, EngineNotification, EngineRequest, EngineSignal, NotificationReceiver,
    NotificationSender, SpeechEngine, UtteranceNotifier, UtteranceTag, notification_channel,
};

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (CLI exit codes, panel
/// messages).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// Preference storage failed.
    #[error(transparent)]
    Preferences(#[from] PreferencesError),

    /// Data directory resolution failed.
    #[error(transparent)]
    Path(#[from] crate::paths::PathError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),
}
