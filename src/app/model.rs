//! Browser model: which catalog view is shown, what is selected, and the
//! search filter. Playback requests go straight to the `Player`.

use std::sync::Arc;

use crate::catalog::{Album, Catalog, Playlist, Track};
use crate::player::Player;

/// Which list the browser shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Tracks,
    Albums,
    Playlists,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            Self::Tracks => Self::Albums,
            Self::Albums => Self::Playlists,
            Self::Playlists => Self::Tracks,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Tracks => "Tracks",
            Self::Albums => "Albums",
            Self::Playlists => "Playlists",
        }
    }
}

/// The main application model.
pub struct App {
    catalog: Catalog,
    pub view: View,
    pub selected: usize,
    pub filter_mode: bool,
    pub filter_query: String,
}

fn any_field_contains(query: &str, fields: &[&str]) -> bool {
    fields.iter().any(|f| f.to_lowercase().contains(query))
}

impl App {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            view: View::Tracks,
            selected: 0,
            filter_mode: false,
            filter_query: String::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn query(&self) -> String {
        self.filter_query.trim().to_lowercase()
    }

    /// Tracks matching the filter, in catalog order.
    pub fn visible_tracks(&self) -> Vec<Arc<Track>> {
        self.catalog.search(&self.filter_query)
    }

    /// Albums whose title, label, genres or moods match the filter.
    pub fn visible_albums(&self) -> Vec<&Album> {
        let q = self.query();
        self.catalog
            .albums()
            .iter()
            .filter(|a| {
                q.is_empty()
                    || any_field_contains(&q, &[a.title.as_str(), a.label.as_str()])
                    || a.genres.iter().chain(&a.moods).any(|g| g.to_lowercase().contains(&q))
            })
            .collect()
    }

    /// Playlists whose title or category match the filter.
    pub fn visible_playlists(&self) -> Vec<&Playlist> {
        let q = self.query();
        self.catalog
            .playlists()
            .iter()
            .filter(|p| {
                q.is_empty() || any_field_contains(&q, &[p.title.as_str(), p.category.as_str()])
            })
            .collect()
    }

    /// Number of rows in the current view.
    pub fn row_count(&self) -> usize {
        match self.view {
            View::Tracks => self.visible_tracks().len(),
            View::Albums => self.visible_albums().len(),
            View::Playlists => self.visible_playlists().len(),
        }
    }

    /// Title of the album `track` belongs to.
    pub fn album_title(&self, track: &Track) -> Option<&str> {
        self.catalog
            .find_album_by_id(&track.album_id)
            .map(|a| a.title.as_str())
    }

    pub fn cycle_view(&mut self) {
        self.view = self.view.next();
        self.selected = 0;
    }

    /// Move selection down, wrapping to the top.
    pub fn next(&mut self) {
        let n = self.row_count();
        if n > 0 {
            self.selected = (self.selected.min(n - 1) + 1) % n;
        }
    }

    /// Move selection up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let n = self.row_count();
        if n > 0 {
            self.selected = (self.selected.min(n - 1) + n - 1) % n;
        }
    }

    fn clamp_selected(&mut self) {
        let n = self.row_count();
        if self.selected >= n {
            self.selected = 0;
        }
    }

    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.clamp_selected();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.clamp_selected();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.clamp_selected();
    }

    /// Enter on the selected row.
    ///
    /// A track plays in the context of the visible list (or toggles when it
    /// is already the current track); albums and playlists play from their
    /// first track.
    pub fn activate_selected(&self, player: &mut Player) {
        match self.view {
            View::Tracks => {
                let tracks = self.visible_tracks();
                play_track_in_context(player, tracks, self.selected);
            }
            View::Albums => {
                if let Some(album) = self.visible_albums().get(self.selected) {
                    play_album(player, album);
                }
            }
            View::Playlists => {
                if let Some(playlist) = self.visible_playlists().get(self.selected) {
                    play_playlist(player, &self.catalog, &playlist.id);
                }
            }
        }
    }

    /// Append the selection (one track, or a whole album/playlist) to the
    /// queue.
    pub fn enqueue_selected(&self, player: &mut Player) {
        let tracks: Vec<Arc<Track>> = match self.view {
            View::Tracks => self
                .visible_tracks()
                .get(self.selected)
                .cloned()
                .into_iter()
                .collect(),
            View::Albums => self
                .visible_albums()
                .get(self.selected)
                .map(|a| a.tracks.clone())
                .unwrap_or_default(),
            View::Playlists => self
                .visible_playlists()
                .get(self.selected)
                .map(|p| self.catalog.playlist_tracks(p))
                .unwrap_or_default(),
        };
        for track in tracks {
            player.add_to_queue(track);
        }
    }
}

/// Play `context[index]` with `context` as the queue; toggles instead when
/// that track is already current.
pub fn play_track_in_context(player: &mut Player, context: Vec<Arc<Track>>, index: usize) {
    let Some(track) = context.get(index).cloned() else {
        return;
    };
    if player.current_track().is_some_and(|c| c.id == track.id) {
        player.toggle();
        return;
    }
    player.set_queue(context, index);
    player.play(track);
}

/// Queue the whole album and play its first track.
pub fn play_album(player: &mut Player, album: &Album) {
    play_tracks(player, album.tracks.clone());
}

/// Queue the tracks of playlist `id` that still exist and play the first.
/// Returns false for an unknown playlist.
pub fn play_playlist(player: &mut Player, catalog: &Catalog, id: &str) -> bool {
    let Some(playlist) = catalog.find_playlist_by_id(id) else {
        return false;
    };
    play_tracks(player, catalog.playlist_tracks(playlist));
    true
}

/// Queue `tracks` and play the first one. Empty lists are ignored.
pub fn play_tracks(player: &mut Player, tracks: Vec<Arc<Track>>) {
    let Some(first) = tracks.first().cloned() else {
        return;
    };
    player.set_queue(tracks, 0);
    player.play(first);
}
