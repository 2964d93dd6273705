use crate::record::LogRecord;
use async_trait::async_trait;
use serde::Serialize;
use std::error::Error;

/// Error returned by [`LogSink`] implementations.
pub type SinkError = Box<dyn Error + Send + Sync>;

/// A structured record tagged with the log stream it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudEntry {
    pub log_name: String,
    #[serde(flatten)]
    pub record: LogRecord,
}

/// Asynchronous destination for [`CloudEntry`]s produced by the cloud
/// transport.
///
/// Implementations are responsible for transporting entries to a concrete
/// backend (Cloud Logging, an in-memory buffer, etc). The transport calls
/// the sink from a background task and never awaits it on the caller's
/// thread, so delivery guarantees, retries and backpressure are entirely
/// the sink's business.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Send a single entry to the underlying backend.
    ///
    /// **Returns**
    /// - `Ok(())` if the entry was accepted by the backend.
    /// - `Err(..)` if the backend failed. The transport reports the error
    ///   on stderr and moves on.
    async fn send(&self, entry: &CloudEntry) -> Result<(), SinkError>;

    /// Send a batch of entries collected by the transport.
    ///
    /// Default implementation calls [`send`](Self::send) for each entry and
    /// stops at the first failure. Backends with a bulk API should
    /// override it.
    async fn send_batch(&self, entries: &[CloudEntry]) -> Result<(), SinkError> {
        for entry in entries {
            self.send(entry).await?;
        }
        Ok(())
    }

    /// Flush any buffered entries, if the backend implements buffering.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
