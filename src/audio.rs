//! Audio module: the `AudioEngine` capability and its rodio backends.
//!
//! The rest of the crate only sees `AudioEngine`, `EngineFactory` and the
//! events in `types`; which backend plays the audio is a configuration
//! choice made in `RodioFactory`.

mod engine;
mod output;
mod session;
mod streaming;
mod types;
mod waveform;

pub use engine::{AudioEngine, EngineFactory};
pub use output::RodioFactory;
pub use streaming::StreamingEngine;
pub use types::*;
pub use waveform::WaveformEngine;
