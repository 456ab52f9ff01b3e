#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

// Dev-dependencies only used by the integration tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use proptest as _;

pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod highlight;
pub mod segmenter;
pub mod sequencer;
pub mod text_utils;

// Re-export key types for convenience
pub use controller::{PanelCommand, SpeechController};
pub use engine::{SimulatedEngine, SimulatedEngineConfig};
pub use error::SpeechError;
pub use events::{PlaybackEvent, PlaybackNotice};
pub use highlight::SpanHighlighter;
pub use segmenter::segment;
pub use sequencer::{Scheduled, Sequencer, SequencerChannels, Step};
pub use text_utils::strip_markdown;
