use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Position, Rect},
};
use tracing::debug;

use crate::app::App;
use crate::audio::EngineFactory;
use crate::config;
use crate::player::Player;
use crate::transport::Transport;
use crate::ui;
use crate::waveform::{WaveformView, seek_fraction};

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Where the waveform was last drawn.
    pub wave_area: Rect,
    /// A mouse seek gesture is in progress.
    pub dragging: bool,
}

/// Main terminal event loop: applies engine events, draws, and handles input.
/// Returns `Ok(())` when the user quits.
pub fn run<F: EngineFactory>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player,
    transport: &mut Transport<F>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        transport.pump(player);

        terminal.draw(|f| {
            state.wave_area = ui::draw(
                f,
                app,
                player,
                transport,
                &settings.ui,
                &settings.controls,
            );
        })?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, settings, app, player, transport, state) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, player, transport, state),
                _ => {}
            }
            transport.sync(player);
        }
    }

    Ok(())
}

/// Apply one key press. Returns `true` when the user asked to quit.
pub fn handle_key_event<F: EngineFactory>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player,
    transport: &mut Transport<F>,
    state: &mut EventLoopState,
) -> bool {
    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char('j') | KeyCode::Char('n')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.next();
            }
            KeyCode::Char('k') | KeyCode::Char('p')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.prev();
            }
            KeyCode::Down => app.next(),
            KeyCode::Up => app.prev(),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            KeyCode::Enter => {
                app.exit_filter_mode();
                if app.row_count() > 0 {
                    app.activate_selected(player);
                }
            }
            _ => {}
        }
        return false;
    }

    let controls = &settings.controls;
    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return true;
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.selected = 0;
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.selected = app.row_count().saturating_sub(1);
        }
        code => {
            // g pending should clear on anything else.
            state.pending_gg = false;
            match code {
                KeyCode::Char('/') => app.enter_filter_mode(),
                KeyCode::Tab => app.cycle_view(),
                KeyCode::Char('j') | KeyCode::Down => app.next(),
                KeyCode::Char('k') | KeyCode::Up => app.prev(),
                KeyCode::Enter => app.activate_selected(player),
                KeyCode::Char('a') => app.enqueue_selected(player),
                KeyCode::Char('x') => player.clear_queue(),
                KeyCode::Char('p') | KeyCode::Char(' ') => player.toggle(),
                KeyCode::Char('l') => player.next(),
                KeyCode::Char('h') => player.previous(),
                KeyCode::Char('L') => transport.seek_by(player, controls.scrub_seconds as f64),
                KeyCode::Char('H') => transport.seek_by(player, -(controls.scrub_seconds as f64)),
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    player.set_volume(player.volume() + controls.volume_step);
                }
                KeyCode::Char('-') => player.set_volume(player.volume() - controls.volume_step),
                KeyCode::Char('m') => player.toggle_mute(),
                _ => {}
            }
        }
    }
    false
}

/// Mouse seeking on the waveform: press starts a gesture, drag moves the
/// displayed position, release seeks the audio.
pub fn handle_mouse_event<F: EngineFactory>(
    mouse: MouseEvent,
    player: &mut Player,
    transport: &mut Transport<F>,
    state: &mut EventLoopState,
) {
    let area = state.wave_area;
    let (x, width) = ui::waveform_x(mouse.column, area);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if !area.contains(Position::new(mouse.column, mouse.row)) {
                return;
            }
            let view = WaveformView::new(player.current_track().is_some());
            let mut fraction = None;
            if !view.click(x, width, |f| fraction = Some(f)) {
                return;
            }
            let Some(fraction) = fraction else {
                return;
            };
            transport.begin_seek();
            if transport.is_seeking() {
                state.dragging = true;
                transport.drag_seek(player, fraction * player.duration());
            } else {
                // Nothing loaded to hold a gesture; seek straight away.
                transport.seek_fraction(player, fraction);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if state.dragging => {
            transport.drag_seek(player, seek_fraction(x, width) * player.duration());
        }
        MouseEventKind::Up(MouseButton::Left) if state.dragging => {
            state.dragging = false;
            transport.drag_seek(player, seek_fraction(x, width) * player.duration());
            transport.commit_seek(player);
            debug!(position = player.progress(), "seek committed");
        }
        _ => {}
    }
}
