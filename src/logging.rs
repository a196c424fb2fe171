//! Log setup. The terminal is owned by the UI, so everything goes to a file.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingSettings, default_log_path};
use crate::error::Result;

/// Environment variable holding a `tracing` filter that overrides
/// `logging.level`.
pub const LOG_ENV: &str = "ENCORE_LOG";

fn log_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(default_log_path)
}

fn filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to the configured log file.
///
/// Returns the file in use, or `None` when there is nowhere to write (no
/// configured file and no home directory).
pub fn init(settings: &LoggingSettings) -> Result<Option<PathBuf>> {
    let Some(path) = log_path(settings) else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    // A subscriber may already be installed (tests); keep that one.
    let _ = tracing_subscriber::registry()
        .with(filter(settings))
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_file_wins_over_default() {
        let settings = LoggingSettings {
            file: Some(PathBuf::from("/tmp/encore-test.log")),
            ..LoggingSettings::default()
        };
        assert_eq!(log_path(&settings), Some(PathBuf::from("/tmp/encore-test.log")));
    }

    #[test]
    fn init_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("encore.log");
        let settings = LoggingSettings {
            file: Some(path.clone()),
            level: "debug".to_string(),
        };

        assert_eq!(init(&settings).unwrap(), Some(path.clone()));
        assert!(path.exists());
    }

    #[test]
    fn invalid_level_falls_back_instead_of_failing() {
        let settings = LoggingSettings {
            file: None,
            level: "[[not a filter".to_string(),
        };
        // Must not panic.
        let _ = filter(&settings);
    }
}
