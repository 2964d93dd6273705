use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::level::Level;

/// Canonical, structured form of one log call.
///
/// Built fresh per call by the normalizer, run through the formatting
/// pipeline and handed to exactly one transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    /// Explicit context from the call site. The labels stage moves it into
    /// `labels["context"]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub labels: BTreeMap<String, String>,
    /// Extra fields attached by user format stages.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            context: None,
            args: Vec::new(),
            stack: None,
            labels: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Context label after the labels stage ran.
    pub fn context_label(&self) -> Option<&str> {
        self.labels.get("context").map(String::as_str)
    }
}
