//! Domain types shared between the speech sequencer and its adapters.
//!
//! These are pure data types with no infrastructure dependencies.

mod playback;
mod voice;

pub use playback::{PlaybackActivity, PlaybackSnapshot};
pub use voice::VoiceDescriptor;
