use std::io::BufReader;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::mixer::Mixer;
use rodio::{Decoder, Sink, Source};

use crate::waveform::summary;

use super::engine::AudioEngine;
use super::session::{Prepared, SinkSession, open_source};
use super::types::{EventSink, LoadRequest};

/// Waveform-synchronized backend.
///
/// Decodes the whole file before reporting `Ready`, publishes an amplitude
/// summary of the real audio, then plays from memory. Slower to start than
/// `StreamingEngine` but seeks are exact.
pub struct WaveformEngine {
    session: SinkSession,
    summary_len: usize,
}

impl WaveformEngine {
    pub fn new(
        mixer: Option<Mixer>,
        events: EventSink,
        progress_interval: Duration,
        summary_len: usize,
    ) -> Self {
        Self {
            session: SinkSession::new(mixer, events, progress_interval),
            summary_len: summary_len.max(1),
        }
    }
}

fn prepare_decoded(source: &str, mixer: &Mixer, summary_len: usize) -> Result<Prepared, String> {
    let file = open_source(source)?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("failed to decode {source}: {e}"))?;

    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    if channels == 0 || sample_rate == 0 {
        return Err(format!("{source}: stream has no channels or sample rate"));
    }

    let samples: Vec<f32> = decoder.collect();
    let frames = samples.len() / usize::from(channels);
    let duration = frames as f64 / f64::from(sample_rate);
    let decoded_summary = summary::from_samples(&samples, channels, summary_len);

    let sink = Sink::connect_new(mixer);
    sink.pause();
    sink.append(SamplesBuffer::new(channels, sample_rate, samples));

    Ok(Prepared {
        sink,
        duration: Some(duration),
        summary: Some(decoded_summary),
    })
}

impl AudioEngine for WaveformEngine {
    fn load(&mut self, request: LoadRequest) {
        let summary_len = self.summary_len;
        self.session.load(
            request,
            Box::new(move |source: &str, mixer: &Mixer| {
                prepare_decoded(source, mixer, summary_len)
            }),
        );
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
