use crate::error::LoggerError;
use crate::record::LogRecord;
use crate::sink::{CloudEntry, LogSink};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Buffering and batching settings for [`CloudTransport`].
///
/// **Fields**
/// - `channel_buffer`: maximum number of entries queued before new ones
///   are dropped.
/// - `batch_size`: number of entries handed to the sink at once.
/// - `flush_interval`: longest time a partial batch waits before it is
///   handed over anyway.
#[derive(Clone, Debug)]
pub struct CloudConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
        }
    }
}

/// Transport that tags records with a log-stream name and forwards them
/// to a [`LogSink`] through a bounded channel and a background task.
///
/// `emit` never blocks and never waits for delivery. When the channel is
/// full the entry is dropped and counted.
pub struct CloudTransport {
    log_name: String,
    sender: mpsc::Sender<CloudEntry>,
    worker: JoinHandle<()>,
    /// Successfully enqueued into the channel.
    pub enqueued_entries: Arc<AtomicU64>,
    /// Dropped because the channel was full or closed.
    pub dropped_entries: Arc<AtomicU64>,
}

impl CloudTransport {
    /// Create the transport and spawn its worker on the current tokio
    /// runtime.
    ///
    /// Minimal thresholds are enforced for `channel_buffer`, `batch_size`
    /// and `flush_interval` to avoid degenerate configurations.
    pub fn spawn(
        log_name: impl Into<String>,
        sink: Arc<dyn LogSink>,
        config: CloudConfig,
    ) -> Result<Self, LoggerError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LoggerError::NoRuntime)?;

        let buffer = config.channel_buffer.max(16);
        let batch_size = config.batch_size.max(1);
        let flush_interval = config.flush_interval.max(Duration::from_millis(10));

        let (tx, rx) = mpsc::channel::<CloudEntry>(buffer);
        let worker = runtime.spawn(run_worker(sink, rx, batch_size, flush_interval));

        Ok(Self {
            log_name: log_name.into(),
            sender: tx,
            worker,
            enqueued_entries: Arc::new(AtomicU64::new(0)),
            dropped_entries: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    pub fn emit(&self, record: LogRecord) {
        let entry = CloudEntry {
            log_name: self.log_name.clone(),
            record,
        };

        match self.sender.try_send(entry) {
            Ok(()) => {
                self.enqueued_entries.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(_)) => {
                self.dropped_entries.fetch_add(1, Ordering::Relaxed);
                eprintln!("log channel full, dropping log entry");
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped_entries.fetch_add(1, Ordering::Relaxed);
                eprintln!("log worker stopped, dropping log entry");
            }
        }
    }

    /// Close the channel and wait until the worker has handed every queued
    /// entry to the sink and flushed it.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(e) = self.worker.await {
            eprintln!("log worker terminated abnormally: {}", e);
        }
    }
}

async fn run_worker(
    sink: Arc<dyn LogSink>,
    mut rx: mpsc::Receiver<CloudEntry>,
    batch_size: usize,
    flush_interval: Duration,
) {
    let mut batch = Vec::with_capacity(batch_size);
    // one ticker for the whole loop so incoming entries never postpone a flush
    let mut ticker = interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(entry) => {
                    batch.push(entry);
                    if batch.len() >= batch_size {
                        deliver(&*sink, &mut batch).await;
                    }
                }
                None => {
                    deliver(&*sink, &mut batch).await;
                    if let Err(e) = sink.flush().await {
                        eprintln!("error flushing log sink: {}", e);
                    }
                    break;
                }
            },
            _ = ticker.tick() => {
                deliver(&*sink, &mut batch).await;
            }
        }
    }
}

/// Hand the batch to the sink once. Failures are reported and the batch is
/// discarded either way.
async fn deliver(sink: &dyn LogSink, batch: &mut Vec<CloudEntry>) {
    if batch.is_empty() {
        return;
    }
    if let Err(e) = sink.send_batch(batch).await {
        eprintln!("error sending log batch of {}: {}", batch.len(), e);
    }
    batch.clear();
}
