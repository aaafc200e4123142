//! Bridge for crates logging through the `log` facade.
//!
//! Registered once from `Logger::init`; records from third-party
//! dependencies land in the sink with the same line format as native ones.

use crate::{level::Level, logger};

pub struct CompatLogger;

impl From<log::Level> for Level {
    fn from(lvl: log::Level) -> Self {
        match lvl {
            log::Level::Error => Level::Err,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug => Level::Debug,
            log::Level::Trace => Level::Verb,
        }
    }
}

/// The coarsest `log` filter that still admits everything the current
/// threshold admits. The sink's own check stays authoritative.
pub fn max_level_for(level: Level) -> log::LevelFilter {
    match level {
        Level::Emerg | Level::Alert | Level::Crit | Level::Err => log::LevelFilter::Error,
        Level::Warn => log::LevelFilter::Warn,
        Level::Notice | Level::Info => log::LevelFilter::Info,
        Level::Debug => log::LevelFilter::Debug,
        Level::Verb | Level::Pverb => log::LevelFilter::Trace,
    }
}

impl log::Log for CompatLogger {
    fn enabled(&self, meta: &log::Metadata) -> bool {
        logger::loggable(Level::from(meta.level()))
    }

    fn log(&self, record: &log::Record) {
        if !logger::loggable(Level::from(record.level())) {
            return;
        }
        logger::log(
            record.file().unwrap_or("<unknown>"),
            record.line().unwrap_or(0),
            false,
            *record.args(),
        );
    }

    fn flush(&self) {}
}
