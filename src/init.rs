use crate::layer::LoggerLayer;
use crate::logger::Logger;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Install `logger` as the destination of every `tracing` event in the
/// process.
///
/// **Parameters**
/// - `logger`: the [`Logger`] that will receive the events. Its threshold
///   and transport apply unchanged.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn try_init_tracing(logger: Logger) -> Result<(), SetGlobalDefaultError> {
    let subscriber = Registry::default().with(LoggerLayer::new(logger));
    tracing::subscriber::set_global_default(subscriber)
}

/// Same as [`try_init_tracing`], reporting a second installation on
/// stderr instead of returning it.
pub fn init_tracing(logger: Logger) {
    if let Err(e) = try_init_tracing(logger) {
        eprintln!("tracing subscriber not installed: {}", e);
    }
}
