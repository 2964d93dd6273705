use std::str::FromStr;
use std::sync::OnceLock;

use crate::env::{APP_ENV_ENV, LOGGER_ENV, LOGGER_LEVEL_ENV, LOGGER_NAME_ENV, NO_COLOR_ENV};
use crate::level::Level;

pub const DEFAULT_LOG_NAME: &str = "app";

/// Where records go once formatted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    #[default]
    Console,
    Cloud,
}

impl FromStr for TransportKind {
    type Err = std::convert::Infallible;

    /// `gcloud` and `cloud` select the cloud transport; anything else is
    /// the console.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gcloud" | "cloud" => Ok(TransportKind::Cloud),
            _ => Ok(TransportKind::Console),
        }
    }
}

/// Process-wide logger configuration.
///
/// **Fields**
/// - `level`: minimum severity; records below it are dropped before any
///   transport sees them.
/// - `transport`: console or cloud.
/// - `log_name`: log-stream name for the cloud transport.
/// - `color`: whether console output carries ANSI colors.
/// - `silent`: test mode; records are computed but never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub level: Level,
    pub transport: TransportKind,
    pub log_name: String,
    pub color: bool,
    pub silent: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            transport: TransportKind::Console,
            log_name: DEFAULT_LOG_NAME.to_string(),
            color: true,
            silent: false,
        }
    }
}

static GLOBAL: OnceLock<LoggerConfig> = OnceLock::new();

impl LoggerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Unset or
    /// unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let level = match set(LOGGER_LEVEL_ENV) {
            Some(raw) => raw.parse::<Level>().unwrap_or_else(|e| {
                eprintln!("{}, using {}", e, defaults.level);
                defaults.level
            }),
            None => defaults.level,
        };

        Self {
            level,
            transport: set(LOGGER_ENV)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.transport),
            log_name: set(LOGGER_NAME_ENV).unwrap_or(defaults.log_name),
            color: set(NO_COLOR_ENV).is_none(),
            silent: set(APP_ENV_ENV).map_or(false, |v| v.eq_ignore_ascii_case("test")),
        }
    }

    /// Configuration read from the environment on first use and fixed for
    /// the rest of the process.
    pub fn global() -> &'static LoggerConfig {
        GLOBAL.get_or_init(Self::from_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(LoggerConfig::from_lookup(lookup(&[])), LoggerConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = LoggerConfig::from_lookup(lookup(&[
            ("LOGGER_LEVEL", "debug"),
            ("LOGGER", "gcloud"),
            ("LOGGER_NAME", "billing"),
            ("NO_COLOR", "1"),
            ("APP_ENV", "test"),
        ]));
        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.transport, TransportKind::Cloud);
        assert_eq!(config.log_name, "billing");
        assert!(!config.color);
        assert!(config.silent);
    }

    #[test]
    fn bad_level_falls_back_to_info() {
        let config = LoggerConfig::from_lookup(lookup(&[("LOGGER_LEVEL", "shouty")]));
        assert_eq!(config.level, Level::Info);
    }

    #[test]
    fn empty_no_color_keeps_colors() {
        let config = LoggerConfig::from_lookup(lookup(&[("NO_COLOR", "")]));
        assert!(config.color);
    }

    #[test]
    fn unknown_transport_is_console() {
        let config = LoggerConfig::from_lookup(lookup(&[("LOGGER", "syslog"), ("APP_ENV", "production")]));
        assert_eq!(config.transport, TransportKind::Console);
        assert!(!config.silent);
    }
}
