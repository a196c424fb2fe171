//! Catalog model types: `Track`, `Album`, `Playlist` and the `Catalog` itself.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};

/// A single playable track. Immutable once the catalog is built and shared
/// between the catalog, the queue and the UI through `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    /// Declared duration in seconds. Used until (or instead of) the decoder's.
    pub duration: f64,
    pub bpm: u32,
    /// Opaque locator handed to the audio backend.
    pub audio_url: String,
    pub album_id: String,
    /// Amplitude summary used to draw the waveform.
    pub waveform: Vec<f32>,
    pub is_vocal: bool,
    pub genres: Vec<String>,
    pub moods: Vec<String>,
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub label: String,
    pub cover: Option<String>,
    pub description: String,
    pub genres: Vec<String>,
    pub moods: Vec<String>,
    pub release_date: Option<String>,
    pub tracks: Vec<Arc<Track>>,
}

impl Album {
    /// Sum of the declared durations of every track on the album.
    pub fn total_duration(&self) -> f64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cover: Option<String>,
    pub category: String,
    pub track_ids: Vec<String>,
}

/// Position of a track inside `Catalog::albums`.
#[derive(Debug, Clone, Copy)]
struct TrackSlot {
    album: usize,
    track: usize,
}

/// The in-memory catalog. Lookups are synchronous and always available.
#[derive(Debug, Default)]
pub struct Catalog {
    albums: Vec<Album>,
    playlists: Vec<Playlist>,
    by_track_id: HashMap<String, TrackSlot>,
}

impl Catalog {
    /// Build a catalog, indexing every track by id.
    ///
    /// Fails when two tracks share an id, since the player identifies tracks
    /// (and decides whether to reload audio) purely by id.
    pub fn new(albums: Vec<Album>, playlists: Vec<Playlist>) -> Result<Self> {
        let mut by_track_id = HashMap::new();
        for (album_idx, album) in albums.iter().enumerate() {
            for (track_idx, track) in album.tracks.iter().enumerate() {
                let slot = TrackSlot {
                    album: album_idx,
                    track: track_idx,
                };
                if by_track_id.insert(track.id.clone(), slot).is_some() {
                    return Err(Error::DuplicateTrack(track.id.clone()));
                }
            }
        }

        Ok(Self {
            albums,
            playlists,
            by_track_id,
        })
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn is_empty(&self) -> bool {
        self.by_track_id.is_empty()
    }

    pub fn find_album_by_id(&self, id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == id)
    }

    pub fn find_track_by_id(&self, id: &str) -> Option<Arc<Track>> {
        let slot = self.by_track_id.get(id)?;
        self.albums
            .get(slot.album)
            .and_then(|a| a.tracks.get(slot.track))
            .cloned()
    }

    pub fn find_playlist_by_id(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    /// Every track, album by album, in catalog order.
    pub fn all_tracks(&self) -> Vec<Arc<Track>> {
        self.albums
            .iter()
            .flat_map(|a| a.tracks.iter().cloned())
            .collect()
    }

    /// Resolve a playlist's track ids. Ids that no longer exist are skipped.
    pub fn playlist_tracks(&self, playlist: &Playlist) -> Vec<Arc<Track>> {
        playlist
            .track_ids
            .iter()
            .filter_map(|id| self.find_track_by_id(id))
            .collect()
    }

    /// Case-insensitive substring search over title, genres and moods.
    ///
    /// An empty (or whitespace-only) query matches every track.
    pub fn search(&self, query: &str) -> Vec<Arc<Track>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.all_tracks();
        }

        self.albums
            .iter()
            .flat_map(|a| a.tracks.iter())
            .filter(|t| {
                t.title.to_lowercase().contains(&query)
                    || t.genres.iter().any(|g| g.to_lowercase().contains(&query))
                    || t.moods.iter().any(|m| m.to_lowercase().contains(&query))
            })
            .cloned()
            .collect()
    }
}
