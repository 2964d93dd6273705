use crate::sink::{CloudEntry, LogSink, SinkError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A sink that simply drops all entries.
///
/// Useful for measuring the overhead of the logger itself without any
/// external I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _entry: &CloudEntry) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A sink that keeps every entry in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// logger and inspect the other.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<CloudEntry>>>,
    flushes: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the entries received so far.
    pub fn entries(&self) -> Vec<CloudEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times [`LogSink::flush`] was called.
    pub fn flush_count(&self) -> usize {
        self.flushes.lock().map(|f| *f).unwrap_or(0)
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn send(&self, entry: &CloudEntry) -> Result<(), SinkError> {
        self.entries
            .lock()
            .map_err(|_| "memory sink lock poisoned")?
            .push(entry.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        *self.flushes.lock().map_err(|_| "memory sink lock poisoned")? += 1;
        Ok(())
    }
}
