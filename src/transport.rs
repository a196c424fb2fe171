//! Transport: keeps the active audio engine in step with the `Player`.
//!
//! The player says what should happen; the transport makes the engine do it
//! and feeds engine events back. Each engine instance is tagged with a
//! `Generation` and anything reported by an older instance is dropped.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info, warn};

use crate::audio::{
    AudioEngine, EngineEvent, EngineFactory, EventSink, Generation, LoadRequest, TaggedEvent,
};
use crate::catalog::Track;
use crate::player::Player;

pub struct Transport<F: EngineFactory> {
    factory: F,
    engine: Option<Box<dyn AudioEngine>>,
    generation: Generation,
    tx: Sender<TaggedEvent>,
    rx: Receiver<TaggedEvent>,

    /// Id of the track the current engine was loaded with.
    loaded: Option<String>,
    applied_playing: bool,
    applied_volume: Option<f32>,

    force_reload: bool,
    /// The engine played to the end and nothing was queued after it.
    ended: bool,
    seeking: bool,
    unavailable: bool,
    decoded_summary: Option<Vec<f32>>,
}

impl<F: EngineFactory> Transport<F> {
    pub fn new(factory: F) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            factory,
            engine: None,
            generation: Generation::default(),
            tx,
            rx,
            loaded: None,
            applied_playing: false,
            applied_volume: None,
            force_reload: false,
            ended: false,
            seeking: false,
            unavailable: false,
            decoded_summary: None,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether the loaded track failed to load or decode.
    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    /// Amplitude summary decoded from the loaded audio, if the backend
    /// produced one.
    pub fn decoded_summary(&self) -> Option<&[f32]> {
        self.decoded_summary.as_deref()
    }

    /// Push the player's state to the engine.
    pub fn sync(&mut self, player: &mut Player) {
        let Some(track) = player.current_track().map(Arc::clone) else {
            if self.engine.is_some() || self.loaded.is_some() {
                debug!("no current track; tearing engine down");
                self.teardown();
            }
            let _ = player.take_pending_seek();
            return;
        };

        let replay_after_end = self.ended && player.is_playing() && !self.applied_playing;
        if replay_after_end {
            player.set_progress(0.0);
        }
        if replay_after_end || self.force_reload || self.loaded.as_deref() != Some(track.id.as_str())
        {
            self.reload(player, &track);
        }

        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let volume = player.effective_volume();
        if self.applied_volume != Some(volume) {
            engine.set_volume(volume);
            self.applied_volume = Some(volume);
        }
        if self.applied_playing != player.is_playing() {
            if player.is_playing() {
                engine.play();
            } else {
                engine.pause();
            }
            self.applied_playing = player.is_playing();
        }
        if let Some(seconds) = player.take_pending_seek() {
            engine.seek(seconds);
        }
    }

    /// Apply every queued engine event to `player`, then `sync`.
    pub fn pump(&mut self, player: &mut Player) {
        while let Ok(TaggedEvent { generation, event }) = self.rx.try_recv() {
            if generation != self.generation || self.engine.is_none() {
                debug!(?generation, current = ?self.generation, "discarding stale engine event");
                continue;
            }
            self.apply(player, event);
        }
        self.sync(player);
    }

    fn apply(&mut self, player: &mut Player, event: EngineEvent) {
        match event {
            EngineEvent::Ready { duration } => player.set_duration(duration),
            EngineEvent::Progress { position } => {
                if !self.seeking {
                    player.set_progress(position);
                }
            }
            EngineEvent::Finished => {
                let before = player.current_track().map(|t| t.id.clone());
                player.next();
                if player.queue().is_empty() {
                    // Nothing to advance to. The spent engine is replaced
                    // the next time playback is resumed.
                    self.ended = true;
                } else if player.current_track().map(|t| t.id.clone()) == before {
                    self.force_reload = true;
                }
            }
            EngineEvent::Error { cause } => {
                warn!(track = ?self.loaded, %cause, "track unavailable");
                self.unavailable = true;
                if let Some(engine) = &self.engine {
                    player.set_duration(engine.duration());
                }
            }
            EngineEvent::Summary(summary) => self.decoded_summary = Some(summary),
        }
    }

    fn reload(&mut self, player: &mut Player, track: &Track) {
        self.teardown();
        self.generation = self.generation.next();
        info!(track = %track.id, generation = self.generation.0, "loading track");

        let mut engine = self
            .factory
            .create(EventSink::new(self.generation, self.tx.clone()));
        engine.set_volume(player.effective_volume());
        engine.load(LoadRequest {
            source: track.audio_url.clone(),
            declared_duration: track.duration,
        });

        self.engine = Some(engine);
        self.loaded = Some(track.id.clone());
        self.applied_volume = Some(player.effective_volume());
        self.applied_playing = false;
        player.set_duration(track.duration);
    }

    fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        self.loaded = None;
        self.applied_playing = false;
        self.applied_volume = None;
        self.force_reload = false;
        self.ended = false;
        self.seeking = false;
        self.unavailable = false;
        self.decoded_summary = None;
    }

    /// Start a seek gesture. Engine progress is ignored until it ends.
    pub fn begin_seek(&mut self) {
        if self.engine.is_some() {
            self.seeking = true;
        }
    }

    /// Move the displayed position during a gesture without seeking audio.
    pub fn drag_seek(&mut self, player: &mut Player, seconds: f64) {
        if !self.seeking || !seconds.is_finite() {
            return;
        }
        let duration = player.duration();
        let seconds = if duration > 0.0 {
            seconds.clamp(0.0, duration)
        } else {
            seconds.max(0.0)
        };
        player.set_progress(seconds);
    }

    /// End the gesture and seek the audio to where it was released.
    pub fn commit_seek(&mut self, player: &mut Player) {
        if !self.seeking {
            return;
        }
        self.seeking = false;
        self.drop_queued_progress();
        player.seek(player.progress());
        self.forward_seek(player);
    }

    /// Throw away `Progress` reports already queued. They predate the seek
    /// and would drag the displayed position back for a tick.
    fn drop_queued_progress(&mut self) {
        let queued: Vec<TaggedEvent> = self.rx.try_iter().collect();
        for tagged in queued {
            if !matches!(tagged.event, EngineEvent::Progress { .. }) {
                let _ = self.tx.send(tagged);
            }
        }
    }

    /// Click-to-seek: jump to `fraction` of the track.
    pub fn seek_fraction(&mut self, player: &mut Player, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        player.seek(fraction.clamp(0.0, 1.0) * player.duration());
        self.forward_seek(player);
    }

    /// Scrub by `delta` seconds relative to the current position.
    pub fn seek_by(&mut self, player: &mut Player, delta: f64) {
        player.seek(player.progress() + delta);
        self.forward_seek(player);
    }

    fn forward_seek(&mut self, player: &mut Player) {
        let Some(seconds) = player.take_pending_seek() else {
            return;
        };
        if let Some(engine) = self.engine.as_mut() {
            engine.seek(seconds);
        }
    }

    /// Destroy the engine. Used on quit.
    pub fn shutdown(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests;
