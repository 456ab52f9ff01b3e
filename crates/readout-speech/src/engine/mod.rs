//! Speech engine implementations.
//!
//! The sequencer only ever sees `Box<dyn SpeechEngine>`, so engines can be
//! swapped without touching playback logic.
//!
//! | Module          | Engine                                   |
//! |-----------------|------------------------------------------|
//! | [`simulated`]   | Timer-driven engine for headless runs    |

pub mod simulated;

pub use simulated::{SimulatedEngine, SimulatedEngineConfig};
