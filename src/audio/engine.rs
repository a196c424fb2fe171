use super::types::{EventSink, LoadRequest};

/// Capability surface of one playback backend instance.
///
/// An instance plays at most one source. None of the methods fail: problems
/// during `load` surface as an `EngineEvent::Error` on the instance's
/// `EventSink`, and everything else degrades to a no-op.
pub trait AudioEngine {
    /// Start loading asynchronously. Reports `Ready` or `Error` later.
    fn load(&mut self, request: LoadRequest);

    /// Start or resume output. Before `Ready` this is recorded as intent.
    fn play(&mut self);

    /// Pause output. Before `Ready` this overrides an earlier `play`.
    fn pause(&mut self);

    /// Jump to `seconds`. Ignored until the instance is ready.
    fn seek(&mut self, seconds: f64);

    /// Set output volume in `[0, 1]`; applied immediately or on `Ready`.
    fn set_volume(&mut self, volume: f32);

    /// Current position in seconds, 0 before `Ready`.
    fn position(&self) -> f64;

    /// Best known duration: the decoder's once ready, the declared one
    /// before that or after an error.
    fn duration(&self) -> f64;

    /// Stop output and release the source. Idempotent; no events are
    /// delivered afterwards.
    fn destroy(&mut self);
}

/// Creates engine instances bound to an event sink.
pub trait EngineFactory {
    fn create(&mut self, events: EventSink) -> Box<dyn AudioEngine>;
}
