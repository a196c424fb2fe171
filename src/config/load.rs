use std::{env, path::PathBuf};

use crate::error::Error;

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, lets environment variables
/// (prefix `ENCORE__`) override it, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, Error> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("ENCORE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Reject values the player cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: &str| Err(Error::InvalidConfig(msg.to_string()));

        if self.audio.progress_interval_ms == 0 {
            return invalid("audio.progress_interval_ms must be >= 1");
        }
        if !(0.0..=1.0).contains(&self.audio.initial_volume) {
            return invalid("audio.initial_volume must be within [0, 1]");
        }
        if self.audio.summary_length == 0 {
            return invalid("audio.summary_length must be >= 1");
        }
        if self.ui.waveform_rows == 0 {
            return invalid("ui.waveform_rows must be >= 1");
        }
        if !(self.controls.volume_step > 0.0 && self.controls.volume_step <= 1.0) {
            return invalid("controls.volume_step must be within (0, 1]");
        }
        if self.catalog.extensions.iter().all(|e| e.trim().is_empty()) {
            return invalid("catalog.extensions must name at least one extension");
        }
        Ok(())
    }
}

/// Resolve the config path from `ENCORE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ENCORE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

fn xdg_dir(var: &str, home_fallback: &[&str]) -> Option<PathBuf> {
    if let Some(dir) = env::var_os(var) {
        Some(PathBuf::from(dir))
    } else {
        env::var_os("HOME").map(|home| home_fallback.iter().fold(PathBuf::from(home), |p, c| p.join(c)))
    }
}

/// Compute the default config path under `$XDG_CONFIG_HOME/encore/config.toml`
/// or `~/.config/encore/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"]).map(|d| d.join("encore").join("config.toml"))
}

/// Default log file under `$XDG_STATE_HOME/encore/encore.log` or
/// `~/.local/state/encore/encore.log`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", &[".local", "state"]).map(|d| d.join("encore").join("encore.log"))
}
