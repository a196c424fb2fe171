use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::CatalogSettings;
use crate::error::Result;
use crate::waveform::summary;

use super::model::{Album, Catalog, Track};

fn is_audio_file(path: &Path, settings: &CatalogSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Slash-separated path of `path` relative to `root`, used as a stable id.
fn relative_id(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn dir_title(dir: &Path) -> String {
    dir.file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("Unknown album")
        .to_string()
}

/// Tags read from a file; everything is optional since scanned files may be
/// untagged or not decodable at all.
#[derive(Default)]
struct FileTags {
    title: Option<String>,
    album: Option<String>,
    genre: Option<String>,
    duration: f64,
}

fn read_tags(path: &Path) -> FileTags {
    let mut tags = FileTags::default();

    let Ok(tagged) = lofty::read_from_path(path) else {
        debug!(?path, "no readable tags");
        return tags;
    };
    tags.duration = tagged.properties().duration().as_secs_f64();

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        let clean = |v: Option<std::borrow::Cow<'_, str>>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        tags.title = clean(tag.title());
        tags.album = clean(tag.album());
        tags.genre = clean(tag.genre());
    }

    tags
}

/// Build a catalog from the audio files under `dir`.
///
/// Every directory that directly contains audio files becomes an album; track
/// and album ids are paths relative to `dir`, so they stay stable between runs.
pub fn scan(dir: &Path, settings: &CatalogSettings, summary_len: usize) -> Result<Catalog> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            let parent = path.parent().unwrap_or(dir).to_path_buf();
            by_dir.entry(parent).or_default().push(path.to_path_buf());
        }
    }

    let mut albums: Vec<Album> = Vec::with_capacity(by_dir.len());
    for (album_dir, mut files) in by_dir {
        files.sort();
        let album_id = relative_id(dir, &album_dir);

        let mut album_title: Option<String> = None;
        let mut genres: Vec<String> = Vec::new();
        let mut tracks: Vec<Arc<Track>> = Vec::with_capacity(files.len());

        for path in files {
            let tags = read_tags(&path);
            let id = relative_id(dir, &path);
            let title = tags.title.unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("UNKNOWN")
                    .to_string()
            });

            if album_title.is_none() {
                album_title = tags.album;
            }
            let track_genres: Vec<String> = tags.genre.into_iter().collect();
            for g in &track_genres {
                if !genres.contains(g) {
                    genres.push(g.clone());
                }
            }

            tracks.push(Arc::new(Track {
                waveform: summary::generate(summary_len.max(1), summary::seed_for_id(&id)),
                id,
                title,
                duration: tags.duration,
                bpm: 0,
                audio_url: path.display().to_string(),
                album_id: album_id.clone(),
                is_vocal: false,
                genres: track_genres,
                moods: Vec::new(),
                instruments: Vec::new(),
            }));
        }

        albums.push(Album {
            title: album_title.unwrap_or_else(|| dir_title(&album_dir)),
            id: album_id,
            label: String::new(),
            cover: None,
            description: String::new(),
            genres,
            moods: Vec::new(),
            release_date: None,
            tracks,
        });
    }

    albums.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    Catalog::new(albums, Vec::new())
}
