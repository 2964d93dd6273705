//! Environment variable names read by this crate.
//!
//! Only [`LoggerConfig`](crate::config::LoggerConfig) and the default cloud
//! sink read them; everything else receives configuration explicitly.

/// Minimum severity, e.g. `debug`.
pub const LOGGER_LEVEL_ENV: &str = "LOGGER_LEVEL";

/// Transport selection; `gcloud` selects the cloud transport.
pub const LOGGER_ENV: &str = "LOGGER";

/// Cloud log-stream name.
pub const LOGGER_NAME_ENV: &str = "LOGGER_NAME";

/// Any non-empty value disables console colors.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Runtime environment identifier; `test` suppresses all output.
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Google Cloud project receiving log entries.
pub const LOGGER_GCLOUD_PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

/// Override for the `entries:write` endpoint.
pub const LOGGER_GCLOUD_ENDPOINT_ENV: &str = "LOGGER_GCLOUD_ENDPOINT";

/// OAuth access token sent as a bearer token.
pub const LOGGER_GCLOUD_TOKEN_ENV: &str = "LOGGER_GCLOUD_TOKEN";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
