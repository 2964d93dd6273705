use crate::env::{
    env_or, LOGGER_GCLOUD_ENDPOINT_ENV, LOGGER_GCLOUD_PROJECT_ENV, LOGGER_GCLOUD_TOKEN_ENV,
};
use crate::level::Level;
use crate::sink::{CloudEntry, LogSink, SinkError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::time::{sleep, Duration};

pub const DEFAULT_ENDPOINT: &str = "https://logging.googleapis.com/v2/entries:write";

/// Configuration for [`CloudLoggingSink`].
///
/// The sink posts batches to an `entries:write` endpoint. Obtaining the
/// access token is left to the caller (metadata server, workload identity,
/// `gcloud auth print-access-token`, ...).
#[derive(Clone, Debug)]
pub struct CloudLoggingConfig {
    /// Full `entries:write` URL.
    pub endpoint: String,
    pub project_id: String,
    /// Monitored resource type attached to every entry.
    pub resource_type: String,
    pub access_token: Option<String>,
    /// Attempts per batch before the error is reported.
    pub max_attempts: u32,
}

impl CloudLoggingConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: project_id.into(),
            resource_type: "global".to_string(),
            access_token: None,
            max_attempts: 3,
        }
    }

    /// Build from `GOOGLE_CLOUD_PROJECT`, `LOGGER_GCLOUD_ENDPOINT` and
    /// `LOGGER_GCLOUD_TOKEN`. Returns `None` when no project is set.
    pub fn from_env() -> Option<Self> {
        let project_id = std::env::var(LOGGER_GCLOUD_PROJECT_ENV)
            .ok()
            .filter(|p| !p.is_empty())?;
        let mut config = Self::new(project_id);
        config.endpoint = env_or(LOGGER_GCLOUD_ENDPOINT_ENV, DEFAULT_ENDPOINT);
        config.access_token = std::env::var(LOGGER_GCLOUD_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty());
        Some(config)
    }
}

/// Cloud Logging implementation of [`LogSink`] over HTTP.
#[derive(Clone)]
pub struct CloudLoggingSink {
    client: Client,
    config: CloudLoggingConfig,
}

impl CloudLoggingSink {
    pub fn new(config: CloudLoggingConfig) -> Self {
        let client = Client::new();
        Self { client, config }
    }

    fn log_name(&self, log_id: &str) -> String {
        format!(
            "projects/{}/logs/{}",
            self.config.project_id,
            urlencoding::encode(log_id)
        )
    }

    fn map_entry(&self, entry: &CloudEntry) -> WireEntry {
        let record = &entry.record;

        let mut payload = Map::new();
        payload.insert("message".to_string(), Value::String(record.message.clone()));
        if !record.args.is_empty() {
            payload.insert("args".to_string(), Value::Array(record.args.clone()));
        }
        if let Some(stack) = &record.stack {
            payload.insert("stack".to_string(), Value::String(stack.clone()));
        }
        for (key, value) in &record.fields {
            payload.insert(key.clone(), value.clone());
        }

        WireEntry {
            log_name: self.log_name(&entry.log_name),
            resource: Resource {
                kind: self.config.resource_type.clone(),
            },
            severity: severity(record.level),
            timestamp: record.timestamp.to_rfc3339(),
            labels: record.labels.clone(),
            json_payload: payload,
        }
    }

    async fn post(&self, body: &WriteRequest) -> Result<(), SinkError> {
        let mut request = self.client.post(&self.config.endpoint).json(body);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(format!("Cloud Logging write failed with status {}: {}", status, text).into())
        }
    }
}

/// Cloud Logging severity name for a level.
pub fn severity(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Verbose | Level::Debug => "DEBUG",
    }
}

#[derive(Serialize)]
struct WriteRequest {
    entries: Vec<WireEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry {
    log_name: String,
    resource: Resource,
    severity: &'static str,
    timestamp: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    labels: BTreeMap<String, String>,
    json_payload: Map<String, Value>,
}

#[derive(Serialize)]
struct Resource {
    #[serde(rename = "type")]
    kind: String,
}

#[async_trait]
impl LogSink for CloudLoggingSink {
    async fn send(&self, entry: &CloudEntry) -> Result<(), SinkError> {
        self.send_batch(std::slice::from_ref(entry)).await
    }

    async fn send_batch(&self, entries: &[CloudEntry]) -> Result<(), SinkError> {
        let body = WriteRequest {
            entries: entries.iter().map(|e| self.map_entry(e)).collect(),
        };

        let mut backoff = Duration::from_millis(100);
        let max_backoff = Duration::from_secs(10);
        let mut attempt = 1;
        loop {
            match self.post(&body).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.config.max_attempts => return Err(e),
                Err(e) => {
                    eprintln!("cloud logging write failed ({}), retrying in {:?}", e, backoff);
                    sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, max_backoff);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LogRecord;
    use serde_json::json;

    #[test]
    fn log_name_is_url_encoded() {
        let sink = CloudLoggingSink::new(CloudLoggingConfig::new("proj-1"));
        assert_eq!(sink.log_name("api/requests"), "projects/proj-1/logs/api%2Frequests");
    }

    #[test]
    fn entry_maps_to_wire_shape() {
        let sink = CloudLoggingSink::new(CloudLoggingConfig::new("proj-1"));
        let mut record = LogRecord::new(Level::Warn, "low disk");
        record.labels.insert("context".into(), "Disk".into());
        record.args.push(json!({"free": 3}));
        let wire = sink.map_entry(&CloudEntry {
            log_name: "app".into(),
            record,
        });

        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["logName"], "projects/proj-1/logs/app");
        assert_eq!(value["severity"], "WARNING");
        assert_eq!(value["resource"]["type"], "global");
        assert_eq!(value["labels"]["context"], "Disk");
        assert_eq!(value["jsonPayload"]["message"], "low disk");
        assert_eq!(value["jsonPayload"]["args"], json!([{"free": 3}]));
        assert!(value["jsonPayload"].get("stack").is_none());
    }

    #[test]
    fn verbose_and_debug_share_severity() {
        assert_eq!(severity(Level::Verbose), "DEBUG");
        assert_eq!(severity(Level::Debug), "DEBUG");
        assert_eq!(severity(Level::Error), "ERROR");
    }
}
