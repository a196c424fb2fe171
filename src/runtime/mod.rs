use std::env;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioFactory;
use crate::logging;
use crate::player::Player;
use crate::transport::Transport;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    match logging::init(&settings.logging) {
        Ok(Some(path)) => info!(log = %path.display(), "encore starting"),
        Ok(None) => {}
        Err(e) => eprintln!("encore: logging disabled: {e}"),
    }

    let arg = env::args().nth(1);
    let source = startup::catalog_source(arg.as_deref(), &settings.catalog);
    let catalog = startup::load_catalog(&source, &settings)?;

    let factory = RodioFactory::open(&settings.audio);
    if !factory.has_output() {
        warn!(backend = ?factory.backend(), "starting without audio output");
    }
    let mut transport = Transport::new(factory);
    let mut player = Player::new(settings.audio.initial_volume);
    let mut app = App::new(catalog);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut player,
            &mut transport,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    transport.shutdown();
    info!("encore stopped");

    run_result
}
