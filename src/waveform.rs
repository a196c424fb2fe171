//! Waveform module: amplitude summaries and the bar-chart renderer.
//!
//! - `summary`: deterministic synthetic summaries plus helpers to normalize,
//!   resample and derive summaries from decoded PCM.
//! - `render`: bar layout, the `Surface` drawing trait and seek mapping.
//! - `raster`: an in-memory RGBA `Surface`.

pub mod raster;
pub mod render;
pub mod summary;

pub use raster::PixelBuffer;
pub use render::{Rgba, Surface, WaveformView, render, seek_fraction};
