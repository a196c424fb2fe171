use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{OutputStream, OutputStreamBuilder};
use tracing::{info, warn};

use crate::config::{AudioSettings, BackendKind};

use super::engine::{AudioEngine, EngineFactory};
use super::streaming::StreamingEngine;
use super::types::EventSink;
use super::waveform::WaveformEngine;

/// Owns the output device and hands out engines of the configured backend.
///
/// The device is opened once; without one every engine still gets created,
/// but its loads fail with an `Error` event.
pub struct RodioFactory {
    // Output stops when the stream is dropped.
    _stream: Option<OutputStream>,
    mixer: Option<Mixer>,
    backend: BackendKind,
    progress_interval: Duration,
    summary_len: usize,
}

impl RodioFactory {
    /// Open the default output device.
    pub fn open(settings: &AudioSettings) -> Self {
        match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when the stream is dropped; that
                // would scribble over the TUI.
                stream.log_on_drop(false);
                let mixer = stream.mixer().clone();
                info!(backend = ?settings.backend, "audio output opened");
                Self::with_parts(Some(stream), Some(mixer), settings)
            }
            Err(e) => {
                warn!(error = %e, "no audio output device; playback disabled");
                Self::with_parts(None, None, settings)
            }
        }
    }

    /// A factory with no output device.
    pub fn without_output(settings: &AudioSettings) -> Self {
        Self::with_parts(None, None, settings)
    }

    fn with_parts(
        stream: Option<OutputStream>,
        mixer: Option<Mixer>,
        settings: &AudioSettings,
    ) -> Self {
        Self {
            _stream: stream,
            mixer,
            backend: settings.backend,
            progress_interval: Duration::from_millis(settings.progress_interval_ms),
            summary_len: settings.summary_length,
        }
    }

    pub fn has_output(&self) -> bool {
        self.mixer.is_some()
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }
}

impl EngineFactory for RodioFactory {
    fn create(&mut self, events: EventSink) -> Box<dyn AudioEngine> {
        let mixer = self.mixer.clone();
        match self.backend {
            BackendKind::Streaming => {
                Box::new(StreamingEngine::new(mixer, events, self.progress_interval))
            }
            BackendKind::Waveform => Box::new(WaveformEngine::new(
                mixer,
                events,
                self.progress_interval,
                self.summary_len,
            )),
        }
    }
}
