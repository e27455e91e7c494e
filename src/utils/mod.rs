//! Utility modules for the sweeper

pub mod file_input;
pub mod target_parser;

/// Logging utilities
pub struct Logger;

impl Logger {
    /// Initialize logger with specified level; `RUST_LOG` still takes precedence
    pub fn init(level: log::LevelFilter) {
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_timestamp_secs()
            .try_init();
    }
}
