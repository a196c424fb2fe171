//! Shared machinery behind both rodio engines: a loader thread that prepares a
//! paused `Sink`, a ticker thread that reports progress, and the intent
//! bookkeeping that lets callers drive the engine before it is ready.

use std::fs::File;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use rodio::Sink;
use rodio::mixer::Mixer;
use tracing::{debug, warn};

use super::types::{EngineEvent, EventSink, LoadRequest};

/// What a backend hands back once its source is decodable.
pub(super) struct Prepared {
    /// Paused sink with the source already appended.
    pub sink: Sink,
    /// Decoder-reported duration, if known.
    pub duration: Option<f64>,
    /// Decoded amplitude summary, if the backend computes one.
    pub summary: Option<Vec<f32>>,
}

pub(super) type PrepareFn = Box<dyn FnOnce(&str, &Mixer) -> Result<Prepared, String> + Send>;

#[derive(Default)]
struct Shared {
    sink: Option<Sink>,
    want_playing: bool,
    volume: f32,
    duration: f64,
    failed: bool,
    destroyed: bool,
}

impl Shared {
    fn ready(&self) -> bool {
        self.sink.is_some()
    }
}

pub(super) struct SinkSession {
    shared: Arc<Mutex<Shared>>,
    mixer: Option<Mixer>,
    events: EventSink,
    interval: Duration,
    loaded: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Open the file behind `locator`. Plain paths and `file://` URLs are
/// supported; other schemes are reported as unsupported.
pub(super) fn open_source(locator: &str) -> Result<File, String> {
    let path = locator.strip_prefix("file://").unwrap_or(locator);
    if path.contains("://") {
        return Err(format!("unsupported audio source {locator}"));
    }
    File::open(path).map_err(|e| format!("failed to open {path}: {e}"))
}

impl SinkSession {
    pub(super) fn new(mixer: Option<Mixer>, events: EventSink, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                volume: 1.0,
                ..Shared::default()
            })),
            mixer,
            events,
            interval: interval.max(Duration::from_millis(10)),
            loaded: false,
        }
    }

    pub(super) fn load(&mut self, request: LoadRequest, prepare: PrepareFn) {
        if self.loaded {
            warn!(source = %request.source, "engine instance already loaded; ignoring");
            return;
        }
        self.loaded = true;

        {
            let mut s = lock(&self.shared);
            if s.destroyed {
                return;
            }
            s.duration = request.declared_duration.max(0.0);
        }

        let Some(mixer) = self.mixer.clone() else {
            lock(&self.shared).failed = true;
            self.events.emit(EngineEvent::Error {
                cause: "no audio output device".to_string(),
            });
            return;
        };

        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let interval = self.interval;
        thread::spawn(move || {
            let result = prepare(&request.source, &mixer);

            // Everything below happens under the lock so that `destroy` on
            // the UI thread either wins outright or sees the finished load.
            let mut s = lock(&shared);
            if s.destroyed {
                if let Ok(prepared) = result {
                    prepared.sink.stop();
                }
                return;
            }

            match result {
                Ok(prepared) => {
                    prepared.sink.set_volume(s.volume);
                    if s.want_playing {
                        prepared.sink.play();
                    }
                    if let Some(d) = prepared.duration.filter(|d| d.is_finite() && *d > 0.0) {
                        s.duration = d;
                    }
                    if let Some(summary) = prepared.summary {
                        events.emit(EngineEvent::Summary(summary));
                    }
                    s.sink = Some(prepared.sink);
                    debug!(source = %request.source, duration = s.duration, "engine ready");
                    events.emit(EngineEvent::Ready {
                        duration: s.duration,
                    });
                    drop(s);
                    run_ticker(&shared, &events, interval);
                }
                Err(cause) => {
                    warn!(source = %request.source, %cause, "audio load failed");
                    s.failed = true;
                    events.emit(EngineEvent::Error { cause });
                }
            }
        });
    }

    pub(super) fn play(&mut self) {
        let mut s = lock(&self.shared);
        s.want_playing = true;
        if let Some(sink) = &s.sink {
            sink.play();
        }
    }

    pub(super) fn pause(&mut self) {
        let mut s = lock(&self.shared);
        s.want_playing = false;
        if let Some(sink) = &s.sink {
            sink.pause();
        }
    }

    pub(super) fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let s = lock(&self.shared);
        let Some(sink) = &s.sink else {
            return;
        };
        let target = if s.duration > 0.0 {
            seconds.clamp(0.0, s.duration)
        } else {
            seconds.max(0.0)
        };
        if let Err(e) = sink.try_seek(Duration::from_secs_f64(target)) {
            warn!(target, error = %e, "seek failed");
        }
    }

    pub(super) fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        let mut s = lock(&self.shared);
        s.volume = volume;
        if let Some(sink) = &s.sink {
            sink.set_volume(volume);
        }
    }

    pub(super) fn position(&self) -> f64 {
        lock(&self.shared)
            .sink
            .as_ref()
            .map_or(0.0, |sink| sink.get_pos().as_secs_f64())
    }

    pub(super) fn duration(&self) -> f64 {
        lock(&self.shared).duration
    }

    pub(super) fn destroy(&mut self) {
        let mut s = lock(&self.shared);
        if s.destroyed {
            return;
        }
        s.destroyed = true;
        if let Some(sink) = s.sink.take() {
            sink.stop();
        }
    }

    #[cfg(test)]
    pub(super) fn is_destroyed(&self) -> bool {
        lock(&self.shared).destroyed
    }
}

impl Drop for SinkSession {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Report progress every `interval` while playing and `Finished` once the
/// sink runs dry. Returns when the session is destroyed or finished.
fn run_ticker(shared: &Mutex<Shared>, events: &EventSink, interval: Duration) {
    loop {
        thread::sleep(interval);

        let mut s = lock(shared);
        if s.destroyed || s.failed {
            return;
        }
        let (drained, playing, position) = match &s.sink {
            Some(sink) => (
                sink.empty(),
                !sink.is_paused(),
                sink.get_pos().as_secs_f64(),
            ),
            None => return,
        };

        if drained {
            s.want_playing = false;
            events.emit(EngineEvent::Finished);
            return;
        }
        if playing {
            events.emit(EngineEvent::Progress { position });
        }
    }
}
