use std::sync::Arc;

use crate::catalog::Track;

/// `previous()` restarts the current track instead of moving back once this
/// many seconds have been played.
pub const RESTART_THRESHOLD_SECS: f64 = 3.0;

pub const DEFAULT_VOLUME: f32 = 0.8;

/// Playback state: current track, transport flags, queue and cursor.
///
/// Invariant: `is_playing()` implies `current_track().is_some()`.
#[derive(Debug, Clone)]
pub struct Player {
    current: Option<Arc<Track>>,
    playing: bool,
    volume: f32,
    muted: bool,
    progress: f64,
    duration: f64,
    queue: Vec<Arc<Track>>,
    queue_index: usize,
    pending_seek: Option<f64>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

fn sanitize_volume(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

fn same_track(a: &Track, b: &Track) -> bool {
    a.id == b.id
}

impl Player {
    pub fn new(initial_volume: f32) -> Self {
        Self {
            current: None,
            playing: false,
            volume: sanitize_volume(initial_volume),
            muted: false,
            progress: 0.0,
            duration: 0.0,
            queue: Vec::new(),
            queue_index: 0,
            pending_seek: None,
        }
    }

    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn queue(&self) -> &[Arc<Track>] {
        &self.queue
    }

    pub fn queue_index(&self) -> usize {
        self.queue_index
    }

    /// Elapsed fraction in `[0, 1]`; 0 while the duration is unknown.
    pub fn progress_fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.progress / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Make `track` current and start playing it from the top.
    ///
    /// The queue is left alone; the cursor follows the track when it is
    /// queued and falls back to 0 when it isn't.
    pub fn play(&mut self, track: Arc<Track>) {
        self.queue_index = self
            .queue
            .iter()
            .position(|t| same_track(t, &track))
            .unwrap_or(0);
        self.current = Some(track);
        self.playing = true;
        self.progress = 0.0;
        self.pending_seek = None;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn resume(&mut self) {
        if self.current.is_some() {
            self.playing = true;
        }
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Set the stored volume. Raising it above 0 also unmutes.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = sanitize_volume(volume);
        if self.volume > 0.0 {
            self.muted = false;
        }
    }

    /// Mute or unmute. The stored volume is kept either way.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Volume the engine should actually play at: 0 while muted.
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    pub fn set_progress(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.progress = seconds.max(0.0);
        }
    }

    pub fn set_duration(&mut self, seconds: f64) {
        if seconds.is_finite() {
            self.duration = seconds.max(0.0);
        }
    }

    /// Jump to `seconds` within the current track. The engine picks the
    /// position up through `take_pending_seek`.
    pub fn seek(&mut self, seconds: f64) {
        if self.current.is_none() || !seconds.is_finite() {
            return;
        }
        let target = if self.duration > 0.0 {
            seconds.clamp(0.0, self.duration)
        } else {
            seconds.max(0.0)
        };
        self.progress = target;
        self.pending_seek = Some(target);
    }

    pub fn next(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let len = self.queue.len();
        let index = (self.queue_index.min(len - 1) + 1) % len;
        self.jump_to(index);
    }

    /// Go back one track, or restart the current one when more than
    /// `RESTART_THRESHOLD_SECS` have been played.
    pub fn previous(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        if self.progress < RESTART_THRESHOLD_SECS {
            let len = self.queue.len();
            let index = (self.queue_index.min(len - 1) + len - 1) % len;
            self.jump_to(index);
        } else {
            self.progress = 0.0;
            self.pending_seek = Some(0.0);
        }
    }

    fn jump_to(&mut self, index: usize) {
        self.queue_index = index;
        self.current = self.queue.get(index).cloned();
        self.progress = 0.0;
        self.pending_seek = None;
        self.playing = self.current.is_some();
    }

    pub fn add_to_queue(&mut self, track: Arc<Track>) {
        self.queue.push(track);
    }

    /// Replace the queue and make `tracks[start]` current.
    ///
    /// The play flag is kept, except that an out-of-range `start` leaves no
    /// current track and therefore stops playback.
    pub fn set_queue(&mut self, tracks: Vec<Arc<Track>>, start: usize) {
        self.current = tracks.get(start).cloned();
        self.queue = tracks;
        self.queue_index = start;
        self.progress = 0.0;
        self.pending_seek = None;
        if self.current.is_none() {
            self.playing = false;
        }
    }

    /// Back to idle: no queue, no track, nothing playing.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.queue_index = 0;
        self.current = None;
        self.playing = false;
        self.progress = 0.0;
        self.pending_seek = None;
    }

    /// Seek requested since the last call, for the engine to apply.
    pub(crate) fn take_pending_seek(&mut self) -> Option<f64> {
        self.pending_seek.take()
    }
}
