//! The severity scale.
//!
//! Ten ranks, ordered by importance: a *lower* numeric value means a *more*
//! important record. The threshold kept by the logger is a ceiling expressed
//! on this scale, so `Level::Error <= Level::Warn` holds and a record is
//! emitted iff its level is less than or equal to the threshold.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[repr(usize)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// The "emerg" level.
    ///
    /// The process is about to abort.
    Emerg = 0,
    /// The "alert" level.
    ///
    /// Immediate operator attention is required.
    Alert,
    /// The "crit" level.
    ///
    /// Critical condition.
    Crit,
    /// The "err" level.
    ///
    /// Error condition.
    Err,
    /// The "warn" level.
    ///
    /// Designates hazardous situations.
    Warn,
    /// The "notice" level.
    ///
    /// Normal but significant.
    Notice,
    /// The "info" level.
    ///
    /// Designates useful information.
    Info,
    /// The "debug" level.
    ///
    /// Designates lower priority information.
    Debug,
    /// The "verb" level.
    ///
    /// Verbose.
    Verb,
    /// The "pverb" level.
    ///
    /// Pedantically verbose.
    Pverb,
}

static LEVEL_NAMES: [&str; 10] = [
    "emerg", "alert", "crit", "err", "warn", "notice", "info", "debug", "verb", "pverb",
];

impl Level {
    pub fn from_usize(u: usize) -> Option<Level> {
        match u {
            0 => Some(Level::Emerg),
            1 => Some(Level::Alert),
            2 => Some(Level::Crit),
            3 => Some(Level::Err),
            4 => Some(Level::Warn),
            5 => Some(Level::Notice),
            6 => Some(Level::Info),
            7 => Some(Level::Debug),
            8 => Some(Level::Verb),
            9 => Some(Level::Pverb),
            _ => None,
        }
    }

    /// Clamps an arbitrary numeric rank into the valid interval.
    pub fn clamped(rank: i64) -> Level {
        if rank <= Level::Emerg as i64 {
            Level::Emerg
        } else if rank >= Level::Pverb as i64 {
            Level::Pverb
        } else {
            Level::from_usize(rank as usize).unwrap_or(Level::Pverb)
        }
    }

    /// Returns the most important level.
    #[inline]
    pub fn min() -> Level {
        Level::Emerg
    }

    /// Returns the most verbose level.
    #[inline]
    pub fn max() -> Level {
        Level::Pverb
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Emerg => "emerg",
            Level::Alert => "alert",
            Level::Crit => "crit",
            Level::Err => "err",
            Level::Warn => "warn",
            Level::Notice => "notice",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Verb => "verb",
            Level::Pverb => "pverb",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Accepts a level name (case-insensitive) or a numeric rank, which is
    /// clamped into the valid interval.
    fn from_str(level: &str) -> Result<Level, ParseLevelError> {
        if let Ok(rank) = level.parse::<i64>() {
            return Ok(Level::clamped(rank));
        }
        LEVEL_NAMES
            .iter()
            .position(|&name| name.eq_ignore_ascii_case(level))
            .map(|p| Level::from_usize(p).unwrap())
            .ok_or_else(|| ParseLevelError(level.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_importance() {
        assert!(Level::Emerg < Level::Pverb);
        assert!(Level::Err < Level::Warn);
        assert_eq!(Level::Emerg as usize, 0);
        assert_eq!(Level::Pverb as usize, 9);
    }

    #[test]
    fn clamping() {
        assert_eq!(Level::clamped(-42), Level::Emerg);
        assert_eq!(Level::clamped(0), Level::Emerg);
        assert_eq!(Level::clamped(6), Level::Info);
        assert_eq!(Level::clamped(9), Level::Pverb);
        assert_eq!(Level::clamped(1000), Level::Pverb);
    }

    #[test]
    fn parsing() {
        assert_eq!("err".parse::<Level>().unwrap(), Level::Err);
        assert_eq!("NOTICE".parse::<Level>().unwrap(), Level::Notice);
        assert_eq!("7".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("99".parse::<Level>().unwrap(), Level::Pverb);
        assert_eq!("-1".parse::<Level>().unwrap(), Level::Emerg);
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn serde_names_are_lowercase() {
        // toml has no bare scalar documents, go through a small table
        let doc: std::collections::HashMap<String, Level> =
            toml::from_str("level = \"warn\"").unwrap();
        assert_eq!(doc["level"], Level::Warn);
    }
}
