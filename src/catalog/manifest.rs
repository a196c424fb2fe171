use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::waveform::summary;

use super::model::{Album, Catalog, Playlist, Track};

/// On-disk catalog manifest.
///
/// ```toml
/// [[albums]]
/// id = "album-1"
/// title = "Cinematic Horizons"
/// label = "Epic Score"
///
/// [[albums.tracks]]
/// id = "rising-sun"
/// title = "Rising Sun"
/// duration = 182.0
/// audio_url = "audio/rising-sun.mp3"
///
/// [[playlists]]
/// id = "focus"
/// title = "Focus"
/// track_ids = ["rising-sun"]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Manifest {
    albums: Vec<AlbumEntry>,
    playlists: Vec<PlaylistEntry>,
}

#[derive(Debug, Deserialize)]
struct AlbumEntry {
    id: String,
    title: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    moods: Vec<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    tracks: Vec<TrackEntry>,
}

#[derive(Debug, Deserialize)]
struct TrackEntry {
    id: String,
    title: String,
    duration: f64,
    #[serde(default)]
    bpm: u32,
    audio_url: String,
    /// Precomputed amplitude summary; synthesized from the id when absent.
    #[serde(default)]
    waveform: Option<Vec<f32>>,
    #[serde(default)]
    is_vocal: bool,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    moods: Vec<String>,
    #[serde(default)]
    instruments: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    track_ids: Vec<String>,
}

/// Load a catalog from a TOML manifest at `path`.
///
/// Relative `audio_url`s are resolved against the manifest's directory; URLs
/// with a scheme (`http://`, `file://`, ...) and absolute paths are kept as is.
pub fn load_manifest(path: &Path, summary_len: usize) -> Result<Catalog> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&text, path, summary_len)
}

/// Parse manifest `text` as if it had been read from `origin`.
pub(super) fn parse_manifest(text: &str, origin: &Path, summary_len: usize) -> Result<Catalog> {
    let manifest: Manifest = toml::from_str(text).map_err(|source| Error::ManifestParse {
        path: origin.to_path_buf(),
        source,
    })?;
    let base = origin.parent().unwrap_or_else(|| Path::new(""));

    let albums = manifest
        .albums
        .into_iter()
        .map(|a| {
            let tracks = a
                .tracks
                .into_iter()
                .map(|t| Arc::new(track_from_entry(t, &a.id, base, summary_len)))
                .collect();
            Album {
                id: a.id,
                title: a.title,
                label: a.label,
                cover: a.cover,
                description: a.description,
                genres: a.genres,
                moods: a.moods,
                release_date: a.release_date,
                tracks,
            }
        })
        .collect();

    let playlists = manifest
        .playlists
        .into_iter()
        .map(|p| Playlist {
            id: p.id,
            title: p.title,
            description: p.description,
            cover: p.cover,
            category: p.category,
            track_ids: p.track_ids,
        })
        .collect();

    Catalog::new(albums, playlists)
}

fn track_from_entry(t: TrackEntry, album_id: &str, base: &Path, summary_len: usize) -> Track {
    let waveform = match t.waveform {
        Some(w) if !w.is_empty() => w,
        _ => summary::generate(summary_len.max(1), summary::seed_for_id(&t.id)),
    };

    Track {
        audio_url: resolve_audio_url(&t.audio_url, base),
        id: t.id,
        title: t.title,
        duration: t.duration.max(0.0),
        bpm: t.bpm,
        album_id: album_id.to_string(),
        waveform,
        is_vocal: t.is_vocal,
        genres: t.genres,
        moods: t.moods,
        instruments: t.instruments,
    }
}

pub(super) fn resolve_audio_url(url: &str, base: &Path) -> String {
    if url.contains("://") || Path::new(url).is_absolute() || base.as_os_str().is_empty() {
        return url.to_string();
    }
    base.join(url).display().to_string()
}
