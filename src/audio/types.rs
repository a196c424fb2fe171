//! Audio-related small types: generations, engine events and the sink
//! engines report through.

use std::sync::mpsc::Sender;

/// Identifies one engine instance. Every reload gets the next generation, so
/// events from a torn-down instance can be told apart from current ones.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Audio is decodable; `duration` is the decoder's, or the declared one
    /// when the decoder cannot tell.
    Ready { duration: f64 },
    /// Periodic position report, only while playing.
    Progress { position: f64 },
    /// The track reached its natural end. Sent at most once per instance.
    Finished,
    /// Loading or decoding failed. No other event follows.
    Error { cause: String },
    /// Amplitude summary of the decoded audio, sent before `Ready`.
    Summary(Vec<f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEvent {
    pub generation: Generation,
    pub event: EngineEvent,
}

/// Sending half handed to each engine, stamped with its generation.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: Generation,
    tx: Sender<TaggedEvent>,
}

impl EventSink {
    pub fn new(generation: Generation, tx: Sender<TaggedEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Deliver `event`. A dropped receiver just means nobody is listening
    /// anymore, so send errors are ignored.
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(TaggedEvent {
            generation: self.generation,
            event,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    /// Locator of the audio: a filesystem path or a `file://` URL.
    pub source: String,
    /// Duration from catalog metadata, used until (or instead of) the
    /// decoder's.
    pub declared_duration: f64,
}
