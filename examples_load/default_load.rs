use std::sync::Arc;
use std::time::Instant;

use gcloud_logger::cloud::CloudConfig;
use gcloud_logger::noop_sink::NoopSink;
use gcloud_logger::{values, Logger, LoggerConfig, LoggerOptions, TransportKind};
use tokio::time::Duration;

#[tokio::main]
async fn main() {
    let config = LoggerConfig {
        transport: TransportKind::Cloud,
        ..LoggerConfig::default()
    };
    let options = LoggerOptions::new()
        .context("load")
        .sink(Arc::new(NoopSink::default()))
        .cloud(CloudConfig {
            channel_buffer: 50_000,
            batch_size: 1_000,
            flush_interval: Duration::from_millis(200),
        });
    let logger = Logger::with_config(options, &config).expect("build logger");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        logger.error(values!["load test error", serde_json::json!({ "iteration": i })]);
    }

    let elapsed = start.elapsed();
    println!("cloud transport: queued {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    logger.shutdown().await;
}
