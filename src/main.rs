mod app;
mod audio;
mod catalog;
mod config;
mod error;
mod logging;
mod player;
mod runtime;
mod transport;
mod ui;
mod waveform;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
