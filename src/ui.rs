//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`: the
//! catalog browser, the mini-player and a braille waveform that doubles as a
//! seek bar.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, View};
use crate::audio::EngineFactory;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::player::Player;
use crate::transport::Transport;
use crate::waveform::{self, PixelBuffer, Rgba};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("tab".to_string(), "tracks/albums/playlists".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    map.insert("a".to_string(), "add to queue".to_string());
    map.insert("x".to_string(), "clear queue".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next".to_string());
    map.insert("m".to_string(), "mute".to_string());
    // H/L and +/- are filled dynamically from config.
    map.insert("/".to_string(), "search".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds and volume step.
fn controls_text(controls: &ControlsSettings) -> String {
    let order = [
        "j/k", "tab", "enter", "a", "x", "space/p", "h/l", "H/L", "+/-", "m", "/", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] scrub -/+{}s", controls.scrub_seconds)),
            "+/-" => Some(format!(
                "[+/-] volume {}%",
                (controls.volume_step * 100.0).round()
            )),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Seconds as a `Duration`; negative or non-finite values become zero.
fn secs(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

fn status_text<F: EngineFactory>(
    app: &App,
    player: &Player,
    transport: &Transport<F>,
    ui: &UiSettings,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    match player.current_track() {
        Some(track) => {
            let state = if player.is_playing() { "Playing" } else { "Paused" };
            let mut song = track.title.clone();
            if let Some(album) = app.album_title(track) {
                song.push_str(" · ");
                song.push_str(album);
            }
            let total = (player.duration() > 0.0).then(|| secs(player.duration()));
            match now_playing_time_text(secs(player.progress()), total, ui) {
                Some(time) => parts.push(format!("Song: {} [{}]", song, time)),
                None => parts.push(format!("Song: {}", song)),
            }
            parts.push(state.to_string());
            if transport.is_unavailable() {
                parts.push("UNAVAILABLE".to_string());
            }
        }
        None => parts.push("Stopped".to_string()),
    }

    if player.is_muted() {
        parts.push(format!("Volume: {:.0}% (muted)", player.volume() * 100.0));
    } else {
        parts.push(format!("Volume: {:.0}%", player.volume() * 100.0));
    }

    if !player.queue().is_empty() {
        parts.push(format!(
            "Queue: {}/{}",
            player.queue_index() + 1,
            player.queue().len()
        ));
    }

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("SEARCH:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        if app.filter_mode {
            filter_part.push('_');
        }
        parts.push(filter_part);
    }

    parts.join(" • ")
}

fn row_items(app: &App, player: &Player) -> Vec<String> {
    let current = player.current_track().map(|t| t.id.as_str());
    match app.view {
        View::Tracks => app
            .visible_tracks()
            .iter()
            .map(|t| {
                let marker = if current == Some(t.id.as_str()) { "♪ " } else { "" };
                let album = app.album_title(t).unwrap_or("-");
                format!(
                    "{}{} · {} · {}",
                    marker,
                    t.title,
                    album,
                    format_mmss(secs(t.duration))
                )
            })
            .collect(),
        View::Albums => app
            .visible_albums()
            .iter()
            .map(|a| {
                format!(
                    "{} ({}) · {} tracks · {}",
                    a.title,
                    a.label,
                    a.tracks.len(),
                    format_mmss(secs(a.total_duration()))
                )
            })
            .collect(),
        View::Playlists => app
            .visible_playlists()
            .iter()
            .map(|p| format!("{} [{}] · {} tracks", p.title, p.category, p.track_ids.len()))
            .collect(),
    }
}

/// One terminal cell of the braille waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BrailleCell {
    glyph: char,
    played: bool,
}

/// Dot bit for column `dx` (0..2) and row `dy` (0..4) of a braille cell.
fn dot_bit(dx: usize, dy: usize) -> u32 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (0, 3) => 0x40,
        (1, 3) => 0x80,
        _ => 0,
    }
}

/// Rasterize the waveform at two dots per column and four per row, then fold
/// the dots into braille glyphs. A cell is played when any of its dots is.
fn braille_cells(
    summary: &[f32],
    progress: f64,
    cols: u16,
    rows: u16,
    unplayed: Rgba,
    played: Rgba,
) -> Vec<Vec<BrailleCell>> {
    let (cols, rows) = (cols as usize, rows as usize);
    let mut buffer = PixelBuffer::new((cols * 2) as f64, 1.0);
    waveform::render(
        &mut buffer,
        summary,
        progress,
        (rows * 4) as f64,
        unplayed,
        played,
    );

    (0..rows)
        .map(|cy| {
            (0..cols)
                .map(|cx| {
                    let mut mask = 0u32;
                    let mut is_played = false;
                    for dy in 0..4 {
                        for dx in 0..2 {
                            let x = (cx * 2 + dx) as f64 + 0.5;
                            let y = (cy * 4 + dy) as f64 + 0.5;
                            let Some(color) = buffer.sample(x, y) else {
                                continue;
                            };
                            if color.a == 0 {
                                continue;
                            }
                            mask |= dot_bit(dx, dy);
                            is_played |= color == played;
                        }
                    }
                    BrailleCell {
                        glyph: char::from_u32(0x2800 + mask).unwrap_or(' '),
                        played: is_played,
                    }
                })
                .collect()
        })
        .collect()
}

fn to_color(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

fn waveform_lines(
    summary: &[f32],
    progress: f64,
    area: Rect,
    ui: &UiSettings,
) -> Vec<Line<'static>> {
    let played = Style::default().fg(to_color(ui.played_color));
    let unplayed = Style::default().fg(to_color(ui.unplayed_color));
    braille_cells(
        summary,
        progress,
        area.width,
        area.height,
        ui.unplayed_color,
        ui.played_color,
    )
    .into_iter()
    .map(|row| {
        Line::from(
            row.into_iter()
                .map(|cell| {
                    let style = if cell.played { played } else { unplayed };
                    Span::styled(cell.glyph.to_string(), style)
                })
                .collect::<Vec<_>>(),
        )
    })
    .collect()
}

/// Terminal column `column` as a logical x position inside the waveform
/// drawn in `area`, plus the logical width. One column is two dots wide.
pub fn waveform_x(column: u16, area: Rect) -> (f64, f64) {
    let x = (column as f64 - area.x as f64) * 2.0 + 1.0;
    (x, area.width as f64 * 2.0)
}

/// Render the entire UI into `frame`. Returns the area the waveform was
/// drawn in so mouse events can be mapped back onto it.
pub fn draw<F: EngineFactory>(
    frame: &mut Frame,
    app: &App,
    player: &Player,
    transport: &Transport<F>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(ui_settings.waveform_rows.saturating_add(2)),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Mini-player status
    let status = status_text(app, player, transport, ui_settings);
    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" now playing "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        let rows = row_items(app, player);

        // Only build ListItems for the visible window, centered on the selection.
        let total = rows.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = rows[start..end]
            .iter()
            .map(|r| ListItem::new(r.as_str()))
            .collect();

        let title = format!(" {} ({}) ", app.view.title().to_lowercase(), total);
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Waveform
    let wave_block = Block::default().borders(Borders::ALL).title(" waveform ");
    let wave_area = wave_block.inner(chunks[3]);
    frame.render_widget(wave_block, chunks[3]);
    if let Some(track) = player.current_track() {
        let summary = transport.decoded_summary().unwrap_or(track.waveform.as_slice());
        let lines = waveform_lines(summary, player.progress_fraction(), wave_area, ui_settings);
        frame.render_widget(Paragraph::new(lines), wave_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    wave_area
}

#[cfg(test)]
mod tests;
