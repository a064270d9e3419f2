//! Logger setup
//!
//! The level is decided once at startup from an explicit [`LogSettings`];
//! `RUST_LOG` can still refine it.

use log::LevelFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
        }
    }
}

impl LogSettings {
    /// `debug` wins over `quiet`
    pub fn from_flags(debug: bool, quiet: bool) -> Self {
        let level = if debug {
            LevelFilter::Debug
        } else if quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Info
        };
        Self { level }
    }
}

/// Install the global logger. Later calls are ignored.
pub fn init(settings: &LogSettings) {
    let _ = pretty_env_logger::formatted_builder()
        .filter_level(settings.level)
        .parse_env("RUST_LOG")
        .try_init();
}
