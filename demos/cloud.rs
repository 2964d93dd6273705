use std::sync::Arc;

use gcloud_logger::gcloud::{CloudLoggingConfig, CloudLoggingSink};
use gcloud_logger::{values, Logger, LoggerConfig, LoggerOptions, TransportKind};

#[tokio::main]
async fn main() {
    // GOOGLE_CLOUD_PROJECT=my-project LOGGER_GCLOUD_TOKEN=$(gcloud auth print-access-token)
    let sink_config = CloudLoggingConfig::from_env().expect("GOOGLE_CLOUD_PROJECT must be set");

    let config = LoggerConfig {
        transport: TransportKind::Cloud,
        ..LoggerConfig::from_env()
    };
    let options = LoggerOptions::new()
        .context("Orders")
        .log_name("orders-api")
        .sink(Arc::new(CloudLoggingSink::new(sink_config)));
    let logger = Logger::with_config(options, &config).expect("build logger");

    logger.info(values!["order accepted", serde_json::json!({ "order_id": 42 })]);
    logger.error(values!["payment declined", "Error: declined\n    at charge (billing.js:3:9)"]);

    logger.shutdown().await;
}
