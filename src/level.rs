use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::LoggerError;

/// Severity of a log record.
///
/// Ordering follows npm-style priorities where a lower number is more
/// severe: `error` (0), `warn` (1), `info` (2), `verbose` (4), `debug` (5).
/// A record passes a threshold when its priority is less than or equal to
/// the threshold's priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    #[default]
    Info,
    Verbose,
    Debug,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 5] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Verbose,
        Level::Debug,
    ];

    pub fn priority(self) -> u8 {
        match self {
            Level::Error => 0,
            Level::Warn => 1,
            Level::Info => 2,
            Level::Verbose => 4,
            Level::Debug => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Verbose => "verbose",
            Level::Debug => "debug",
        }
    }

    /// Returns `true` if a record at `self` passes the `threshold`.
    pub fn passes(self, threshold: Level) -> bool {
        self.priority() <= threshold.priority()
    }

    /// Length of the longest level name, used for column alignment.
    pub fn max_name_len() -> usize {
        Level::ALL
            .iter()
            .map(|level| level.as_str().len())
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" | "fatal" => Ok(Level::Error),
            "warn" | "warning" => Ok(Level::Warn),
            "info" | "log" => Ok(Level::Info),
            "verbose" => Ok(Level::Verbose),
            "debug" => Ok(Level::Debug),
            _ => Err(LoggerError::UnknownLevel(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            _ => Level::Debug,
        }
    }
}
