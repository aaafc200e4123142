//! relog - a process-wide logging sink for long-running daemons.
//!
//! One destination per process: a file opened append-only, or the standard
//! error stream. Records are formatted into bounded stack buffers and
//! appended with a single write call, so lines from concurrent threads do
//! not interleave and the hot path never allocates. The caller's `errno` is
//! preserved across every emitter call, and emitter failures are swallowed
//! and counted rather than surfaced.
//!
//! ```no_run
//! use relog::{info, Level, Logger};
//!
//! Logger::init(Level::Info, Some("/var/log/relay.log"))?;
//! info!("starting up");
//! # Ok::<(), relog::LogError>(())
//! ```
//!
//! External rotation is handled with [`Logger::reopen`]: the rotation tool
//! renames the live file and signals the daemon, which reopens the same
//! path on its main loop (see [`rotate`]). Records carry the caller's
//! source location and a civil-time timestamp:
//!
//! ```text
//! [Thu Aug  7 14:03:05 2026] src/server.rs:211 accepting on 0.0.0.0:8080
//! ```

#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod logger;

pub mod buffer;
pub mod compat;
pub mod config;
pub mod display;
pub mod hexdump;
pub mod level;
pub mod rotate;

pub use crate::buffer::LOG_MAX_LEN;
pub use crate::config::{setup_logging, LogConfig, DEFAULT_LOG_LEVEL};
pub use crate::level::{Level, ParseLevelError};
pub use crate::logger::{
    error_count, level_down, level_set, level_up, loggable, threshold, LogError, Logger,
    LoggerBackend,
};
