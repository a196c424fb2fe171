use super::*;
use crate::app::App;
use crate::audio::RodioFactory;
use crate::catalog::{Album, Catalog, Track};
use crate::config::{AudioSettings, ControlsSettings, UiSettings};
use crate::player::Player;
use crate::transport::Transport;
use ratatui::{Terminal, backend::TestBackend};
use std::sync::Arc;

fn ui_with(fields: Vec<TimeField>) -> UiSettings {
    UiSettings {
        now_playing_time_fields: fields,
        ..UiSettings::default()
    }
}

#[test]
fn format_mmss_pads_minutes_and_seconds() {
    assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
    assert_eq!(format_mmss(Duration::from_secs(75)), "01:15");
    assert_eq!(format_mmss(secs(-3.0)), "00:00");
    assert_eq!(format_mmss(secs(f64::NAN)), "00:00");
    assert_eq!(format_mmss(secs(59.9)), "00:59");
}

#[test]
fn time_text_follows_configured_fields() {
    let elapsed = Duration::from_secs(30);
    let total = Some(Duration::from_secs(90));

    let ui = ui_with(vec![TimeField::Elapsed, TimeField::Total]);
    assert_eq!(
        now_playing_time_text(elapsed, total, &ui).as_deref(),
        Some("00:30 / 01:30")
    );

    let ui = ui_with(vec![TimeField::Remaining]);
    assert_eq!(
        now_playing_time_text(elapsed, total, &ui).as_deref(),
        Some("-01:00")
    );

    // Total and remaining need a known duration.
    let ui = ui_with(vec![TimeField::Total, TimeField::Remaining]);
    assert_eq!(now_playing_time_text(elapsed, None, &ui), None);

    let ui = ui_with(Vec::new());
    assert_eq!(now_playing_time_text(elapsed, total, &ui), None);
}

#[test]
fn controls_text_includes_configured_steps() {
    let text = controls_text(&ControlsSettings::default());
    assert!(text.contains("[H/L] scrub -/+5s"));
    assert!(text.contains("[+/-] volume 5%"));
    assert!(text.starts_with("[j/k] up/down"));
    assert!(text.ends_with("[q] quit"));
}

#[test]
fn dot_bits_cover_a_full_cell() {
    let mut all = 0;
    for dy in 0..4 {
        for dx in 0..2 {
            let bit = dot_bit(dx, dy);
            assert_eq!(all & bit, 0, "dot ({dx}, {dy}) reuses a bit");
            all |= bit;
        }
    }
    assert_eq!(all, 0xff);
}

#[test]
fn braille_cells_fold_bars_into_glyphs() {
    let unplayed = Rgba::rgb(1, 1, 1);
    let played = Rgba::rgb(2, 2, 2);
    // 8x8 dots: two full-height bars, 4 dots tall, centered.
    let cells = braille_cells(&[1.0; 4], 0.0, 4, 2, unplayed, played);

    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0].len(), 4);
    // Lower half of the top row, upper half of the bottom row.
    assert_eq!(cells[0][0].glyph, '\u{28E4}');
    assert_eq!(cells[1][0].glyph, '\u{281B}');
    assert_eq!(cells[0][3].glyph, '\u{2800}');
    assert!(cells.iter().flatten().all(|c| !c.played));
}

#[test]
fn braille_cells_mark_played_region() {
    let unplayed = Rgba::rgb(1, 1, 1);
    let played = Rgba::rgb(2, 2, 2);
    let cells = braille_cells(&[1.0; 4], 0.2, 4, 2, unplayed, played);

    assert!(cells[0][0].played);
    assert!(!cells[0][1].played);
}

#[test]
fn braille_cells_blank_without_summary() {
    let cells = braille_cells(&[], 0.5, 3, 1, Rgba::rgb(1, 1, 1), Rgba::rgb(2, 2, 2));
    assert_eq!(cells.len(), 1);
    assert!(cells[0].iter().all(|c| c.glyph == '\u{2800}' && !c.played));
}

#[test]
fn waveform_x_maps_columns_to_dot_centers() {
    let area = Rect::new(10, 5, 20, 2);
    assert_eq!(waveform_x(10, area), (1.0, 40.0));
    assert_eq!(waveform_x(29, area), (39.0, 40.0));
}

fn track(id: &str, title: &str) -> Arc<Track> {
    Arc::new(Track {
        id: id.into(),
        title: title.into(),
        duration: 95.0,
        bpm: 120,
        audio_url: format!("/music/{id}.mp3"),
        album_id: "noir".into(),
        waveform: vec![0.2, 0.9, 0.5, 1.0],
        is_vocal: false,
        genres: Vec::new(),
        moods: Vec::new(),
        instruments: Vec::new(),
    })
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|c| c.symbol())
        .collect()
}

#[test]
fn draw_shows_catalog_and_now_playing() {
    let smoke = track("smoke", "Smoke Signals");
    let albums = vec![Album {
        id: "noir".into(),
        title: "Noir Nights".into(),
        label: "Label".into(),
        cover: None,
        description: String::new(),
        genres: Vec::new(),
        moods: Vec::new(),
        release_date: None,
        tracks: vec![Arc::clone(&smoke)],
    }];
    let app = App::new(Catalog::new(albums, Vec::new()).unwrap());
    let mut player = Player::default();
    player.set_queue(vec![Arc::clone(&smoke)], 0);
    player.play(smoke);
    let transport = Transport::new(RodioFactory::without_output(&AudioSettings::default()));

    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    let ui = UiSettings::default();
    let mut wave = Rect::default();
    terminal
        .draw(|f| {
            wave = draw(f, &app, &player, &transport, &ui, &ControlsSettings::default());
        })
        .unwrap();

    let text = screen_text(&terminal);
    assert!(text.contains("encore"));
    assert!(text.contains("Smoke Signals"));
    assert!(text.contains("Playing"));
    assert!(text.contains("Queue: 1/1"));
    assert!(text.contains("01:35"));

    assert_eq!(wave.height, ui.waveform_rows);
    assert_eq!(wave.width, 98);
    // Some braille dots were drawn.
    assert!(text.chars().any(|c| ('\u{2801}'..='\u{28ff}').contains(&c)));
}

#[test]
fn draw_without_track_says_stopped() {
    let app = App::new(Catalog::new(Vec::new(), Vec::new()).unwrap());
    let player = Player::default();
    let transport = Transport::new(RodioFactory::without_output(&AudioSettings::default()));

    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal
        .draw(|f| {
            draw(
                f,
                &app,
                &player,
                &transport,
                &UiSettings::default(),
                &ControlsSettings::default(),
            );
        })
        .unwrap();

    let text = screen_text(&terminal);
    assert!(text.contains("Stopped"));
    assert!(text.contains("Volume: 80%"));
}

#[test]
fn status_and_controls_show_mute() {
    let app = App::new(Catalog::new(Vec::new(), Vec::new()).unwrap());
    let mut player = Player::default();
    let transport = Transport::new(RodioFactory::without_output(&AudioSettings::default()));
    player.toggle_mute();

    let status = status_text(&app, &player, &transport, &UiSettings::default());
    assert!(status.contains("Volume: 80% (muted)"));
    assert!(controls_text(&ControlsSettings::default()).contains("[m] mute"));
}
