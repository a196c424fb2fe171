use std::io::BufReader;
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{Decoder, Sink, Source};

use super::engine::AudioEngine;
use super::session::{Prepared, SinkSession, open_source};
use super::types::{EventSink, LoadRequest};

/// Decode-as-you-play backend: the file is streamed through rodio's decoder
/// and playback can start as soon as the header is parsed.
pub struct StreamingEngine {
    session: SinkSession,
}

impl StreamingEngine {
    pub fn new(mixer: Option<Mixer>, events: EventSink, progress_interval: Duration) -> Self {
        Self {
            session: SinkSession::new(mixer, events, progress_interval),
        }
    }
}

fn prepare_streaming(source: &str, mixer: &Mixer) -> Result<Prepared, String> {
    let file = open_source(source)?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("failed to decode {source}: {e}"))?;
    let duration = decoder.total_duration().map(|d| d.as_secs_f64());

    let sink = Sink::connect_new(mixer);
    sink.pause();
    sink.append(decoder);

    Ok(Prepared {
        sink,
        duration,
        summary: None,
    })
}

impl AudioEngine for StreamingEngine {
    fn load(&mut self, request: LoadRequest) {
        self.session.load(request, Box::new(prepare_streaming));
    }

    fn play(&mut self) {
        self.session.play();
    }

    fn pause(&mut self) {
        self.session.pause();
    }

    fn seek(&mut self, seconds: f64) {
        self.session.seek(seconds);
    }

    fn set_volume(&mut self, volume: f32) {
        self.session.set_volume(volume);
    }

    fn position(&self) -> f64 {
        self.session.position()
    }

    fn duration(&self) -> f64 {
        self.session.duration()
    }

    fn destroy(&mut self) {
        self.session.destroy();
    }
}
