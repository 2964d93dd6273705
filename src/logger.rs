use std::fmt;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;

use crate::cloud::{CloudConfig, CloudTransport};
use crate::config::{LoggerConfig, TransportKind};
use crate::console::ConsoleTransport;
use crate::error::LoggerError;
use crate::format::{FormatFn, Pipeline};
use crate::level::Level;
use crate::normalize::normalize;
use crate::record::LogRecord;
use crate::sink::LogSink;
use crate::value::LogValue;

/// Per-logger options. Anything left unset comes from [`LoggerConfig`].
///
/// A bare `&str` or `String` converts into options with only `context`
/// set, so `create_logger("Svc")` binds a default context.
#[derive(Clone, Default)]
pub struct LoggerOptions {
    /// Default context label for records without an explicit one.
    pub context: Option<String>,
    /// Log-stream name for the cloud transport.
    pub log_name: Option<String>,
    /// Minimum severity, overriding the configured one.
    pub level: Option<Level>,
    /// Extra pipeline stage, run after the built-in ones.
    pub format: Option<FormatFn>,
    /// Sink for the cloud transport. Without one the cloud transport falls
    /// back to the HTTP sink configured from the environment.
    pub sink: Option<Arc<dyn LogSink>>,
    pub cloud: CloudConfig,
    /// Overrides test-mode suppression.
    pub silent: Option<bool>,
}

impl LoggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = Some(log_name.into());
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn format(mut self, format: FormatFn) -> Self {
        self.format = Some(format);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn cloud(mut self, cloud: CloudConfig) -> Self {
        self.cloud = cloud;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }
}

impl fmt::Debug for LoggerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerOptions")
            .field("context", &self.context)
            .field("log_name", &self.log_name)
            .field("level", &self.level)
            .field("format", &self.format.as_ref().map(|_| ".."))
            .field("sink", &self.sink.as_ref().map(|_| ".."))
            .field("cloud", &self.cloud)
            .field("silent", &self.silent)
            .finish()
    }
}

impl From<&str> for LoggerOptions {
    fn from(context: &str) -> Self {
        Self::new().context(context)
    }
}

impl From<String> for LoggerOptions {
    fn from(context: String) -> Self {
        Self::new().context(context)
    }
}

/// Destination chosen when the logger is built.
pub enum Transport {
    Console(ConsoleTransport),
    Cloud(CloudTransport),
}

impl Transport {
    pub fn kind(&self) -> TransportKind {
        match self {
            Transport::Console(_) => TransportKind::Console,
            Transport::Cloud(_) => TransportKind::Cloud,
        }
    }

    fn emit(&self, record: LogRecord) {
        match self {
            Transport::Console(console) => console.emit(&record),
            Transport::Cloud(cloud) => cloud.emit(record),
        }
    }
}

/// Create a logger using the process-wide [`LoggerConfig::global`].
///
/// ```
/// use gcloud_logger::{create_logger, values};
///
/// let logger = create_logger("Svc").unwrap();
/// logger.info(values!["started"]);
/// ```
pub fn create_logger(options: impl Into<LoggerOptions>) -> Result<Logger, LoggerError> {
    Logger::with_config(options, LoggerConfig::global())
}

/// Leveled logger with a fixed pipeline and transport.
///
/// Each call runs normalize, pipeline and emit to completion before
/// returning. Nothing about a logger changes after construction.
pub struct Logger {
    context: Option<String>,
    level: Level,
    silent: bool,
    pipeline: Pipeline,
    transport: Transport,
}

impl Logger {
    /// Build a logger from explicit options and configuration.
    ///
    /// Options win over configuration. The cloud transport needs a running
    /// tokio runtime.
    pub fn with_config(
        options: impl Into<LoggerOptions>,
        config: &LoggerConfig,
    ) -> Result<Self, LoggerError> {
        let options = options.into();

        let transport = match config.transport {
            TransportKind::Console => Transport::Console(ConsoleTransport::new(config.color)),
            TransportKind::Cloud => {
                let log_name = options
                    .log_name
                    .clone()
                    .unwrap_or_else(|| config.log_name.clone());
                let sink = match options.sink.clone() {
                    Some(sink) => sink,
                    None => default_sink()?,
                };
                Transport::Cloud(CloudTransport::spawn(log_name, sink, options.cloud.clone())?)
            }
        };

        Ok(Self::with_transport(options, config, transport))
    }

    /// Build a console logger writing through `make_writer` instead of
    /// stdout.
    pub fn with_writer<W>(options: impl Into<LoggerOptions>, config: &LoggerConfig, make_writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let transport = Transport::Console(ConsoleTransport::with_writer(config.color, make_writer));
        Self::with_transport(options.into(), config, transport)
    }

    fn with_transport(options: LoggerOptions, config: &LoggerConfig, transport: Transport) -> Self {
        Self {
            pipeline: Pipeline::new(options.context.clone(), options.format),
            context: options.context,
            level: options.level.unwrap_or(config.level),
            silent: options.silent.unwrap_or(config.silent),
            transport,
        }
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn enabled(&self, level: Level) -> bool {
        level.passes(self.level)
    }

    /// Build the final record for a call without emitting it.
    ///
    /// Returns `None` when the level is below the threshold or a format
    /// stage dropped the record.
    pub fn prepare<I>(&self, level: Level, values: I) -> Option<LogRecord>
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        if !self.enabled(level) {
            return None;
        }
        let values = values.into_iter().map(Into::into).collect();
        self.pipeline.apply(normalize(level, values))
    }

    pub fn log_at<I>(&self, level: Level, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        let Some(record) = self.prepare(level, values) else {
            return;
        };
        if !self.silent {
            self.transport.emit(record);
        }
    }

    /// Same as [`info`](Self::info).
    pub fn log<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.log_at(Level::Info, values);
    }

    pub fn info<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.log_at(Level::Info, values);
    }

    pub fn error<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.log_at(Level::Error, values);
    }

    pub fn warn<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.log_at(Level::Warn, values);
    }

    pub fn debug<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.log_at(Level::Debug, values);
    }

    pub fn verbose<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.log_at(Level::Verbose, values);
    }

    /// Logged at error level; there is no separate fatal severity.
    pub fn fatal<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.log_at(Level::Error, values);
    }

    /// Per-level filtering is not supported.
    ///
    /// Always returns [`LoggerError::Unsupported`]; set the threshold with
    /// [`LoggerOptions::level`] or `LOGGER_LEVEL` instead.
    pub fn set_log_levels(&self, _levels: &[Level]) -> Result<(), LoggerError> {
        Err(LoggerError::Unsupported("Logger::set_log_levels"))
    }

    /// Wait for the cloud transport to hand every queued record to its
    /// sink. A no-op for the console transport.
    pub async fn shutdown(self) {
        if let Transport::Cloud(cloud) = self.transport {
            cloud.shutdown().await;
        }
    }
}

#[cfg(feature = "gcloud")]
fn default_sink() -> Result<Arc<dyn LogSink>, LoggerError> {
    use crate::gcloud::{CloudLoggingConfig, CloudLoggingSink};

    let config = CloudLoggingConfig::from_env().ok_or_else(|| {
        LoggerError::Sink(format!(
            "{} is not set",
            crate::env::LOGGER_GCLOUD_PROJECT_ENV
        ))
    })?;
    Ok(Arc::new(CloudLoggingSink::new(config)) as Arc<dyn LogSink>)
}

#[cfg(not(feature = "gcloud"))]
fn default_sink() -> Result<Arc<dyn LogSink>, LoggerError> {
    Err(LoggerError::NoSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::format_fn;
    use crate::noop_sink::MemorySink;
    use crate::values;
    use serde_json::json;

    fn console_config() -> LoggerConfig {
        LoggerConfig {
            color: false,
            ..LoggerConfig::default()
        }
    }

    #[test]
    fn string_options_bind_context() {
        let logger = Logger::with_config("Svc", &console_config()).unwrap();
        assert_eq!(logger.context(), Some("Svc"));
        assert_eq!(logger.transport().kind(), TransportKind::Console);

        let record = logger.prepare(Level::Info, values!["started"]).unwrap();
        assert_eq!(record.level, Level::Info);
        assert_eq!(record.message, "started");
        assert_eq!(record.context_label(), Some("Svc"));
    }

    #[test]
    fn threshold_drops_lower_levels() {
        let logger = Logger::with_config(LoggerOptions::new(), &console_config()).unwrap();
        assert!(logger.prepare(Level::Debug, ["x"]).is_none());
        assert!(logger.prepare(Level::Verbose, ["x"]).is_none());
        assert!(logger.prepare(Level::Warn, ["x"]).is_some());
    }

    #[test]
    fn option_level_overrides_config() {
        let config = LoggerConfig {
            level: Level::Error,
            ..console_config()
        };
        let logger = Logger::with_config(LoggerOptions::new().level(Level::Debug), &config).unwrap();
        assert_eq!(logger.level(), Level::Debug);
        assert!(logger.prepare(Level::Debug, ["x"]).is_some());
    }

    #[test]
    fn scenario_context_override_and_args() {
        let logger = Logger::with_config("Svc", &console_config()).unwrap();
        let record = logger
            .prepare(Level::Info, values!["a", json!({"x": 1}), "Ctx"])
            .unwrap();
        assert_eq!(record.context_label(), Some("Ctx"));
        assert_eq!(record.args, vec![json!({"x": 1})]);
    }

    #[test]
    fn format_option_is_applied() {
        let options = LoggerOptions::new().format(format_fn(|mut record| {
            record.labels.insert("service".into(), "billing".into());
            Some(record)
        }));
        let logger = Logger::with_config(options, &console_config()).unwrap();
        let record = logger.prepare(Level::Info, ["x"]).unwrap();
        assert_eq!(record.labels.get("service").map(String::as_str), Some("billing"));
    }

    #[test]
    fn set_log_levels_is_unsupported() {
        let logger = Logger::with_config(LoggerOptions::new(), &console_config()).unwrap();
        let err = logger.set_log_levels(&[Level::Info]).unwrap_err();
        assert!(matches!(err, LoggerError::Unsupported(_)));
    }

    #[test]
    fn cloud_without_runtime_fails() {
        let config = LoggerConfig {
            transport: TransportKind::Cloud,
            ..console_config()
        };
        let options = LoggerOptions::new().sink(Arc::new(MemorySink::new()));
        assert!(matches!(
            Logger::with_config(options, &config),
            Err(LoggerError::NoRuntime)
        ));
    }

    #[tokio::test]
    async fn cloud_log_name_prefers_options() {
        let config = LoggerConfig {
            transport: TransportKind::Cloud,
            log_name: "from-env".into(),
            ..LoggerConfig::default()
        };
        let sink = MemorySink::new();
        let options = LoggerOptions::new()
            .log_name("orders")
            .sink(Arc::new(sink.clone()));
        let logger = Logger::with_config(options, &config).unwrap();
        match logger.transport() {
            Transport::Cloud(cloud) => assert_eq!(cloud.log_name(), "orders"),
            Transport::Console(_) => panic!("expected cloud transport"),
        }
        logger.shutdown().await;
    }
}
