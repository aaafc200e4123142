//! Host-facing configuration block.
//!
//! The sink owns no command-line or environment surface; hosts embed
//! [`LogConfig`] in their own configuration file and hand it to
//! [`setup_logging`] at startup.

use serde::{Deserialize, Serialize};

use crate::{
    level::Level,
    logger::{LogError, Logger},
};

/// Default ceiling when the host does not set one.
pub const DEFAULT_LOG_LEVEL: Level = Level::Notice;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Severity ceiling: a level name ("err", "notice", ..) or a numeric
    /// rank. Invalid values fall back to [`DEFAULT_LOG_LEVEL`] with a note
    /// on the emergency path.
    pub log_level: Option<String>,
    /// Destination: absent, empty or "stderr" for the standard error
    /// stream, anything else is a file path.
    pub log_target: Option<String>,
}

impl LogConfig {
    pub fn level(&self) -> Level {
        match &self.log_level {
            None => DEFAULT_LOG_LEVEL,
            Some(spec) => match spec.parse() {
                Ok(level) => level,
                Err(e) => {
                    log_stderr!("invalid log level in configuration, ignoring it: {}", e);
                    DEFAULT_LOG_LEVEL
                }
            },
        }
    }
}

/// Starts the logger from a host configuration block.
pub fn setup_logging(config: &LogConfig) -> Result<(), LogError> {
    let level = config.level();
    match config.log_target.as_deref() {
        None | Some("") | Some("stderr") => Logger::init::<&str>(level, None),
        Some(path) => Logger::init(level, Some(path)),
    }
}
