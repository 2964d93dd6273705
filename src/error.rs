/// Error type returned by logger construction and configuration.
///
/// Normalizing and rendering records never fails; these variants only
/// surface while a [`Logger`](crate::logger::Logger) is being built or
/// reconfigured.
#[derive(thiserror::Error, Debug)]
pub enum LoggerError {
    /// The operation exists on the API surface but is intentionally not
    /// implemented. Callers must not rely on it.
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("unknown log level: {0}")]
    UnknownLevel(String),

    #[error("cloud transport requires a running tokio runtime")]
    NoRuntime,

    #[error("cloud transport selected but no sink is available")]
    NoSink,

    #[error("failed to build cloud sink: {0}")]
    Sink(String),
}
