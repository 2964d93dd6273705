use std::fmt;
use std::sync::Arc;

use crate::level::Level;
use crate::record::LogRecord;

/// User-supplied pipeline stage. Returning `None` drops the record.
pub type FormatFn = Arc<dyn Fn(LogRecord) -> Option<LogRecord> + Send + Sync>;

/// Wrap a closure as a [`FormatFn`].
pub fn format_fn<F>(f: F) -> FormatFn
where
    F: Fn(LogRecord) -> Option<LogRecord> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One step of the shared pipeline every record passes through before it
/// reaches a transport.
#[derive(Clone)]
pub enum Stage {
    /// Collapse `stack` into `message` when the stack already embeds it.
    FixStack,
    /// Move the record's context (or the bound default) into `labels`.
    AddLabels { default_context: Option<String> },
    Custom(FormatFn),
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::FixStack => f.write_str("FixStack"),
            Stage::AddLabels { default_context } => f
                .debug_struct("AddLabels")
                .field("default_context", default_context)
                .finish(),
            Stage::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Stage {
    fn apply(&self, record: LogRecord) -> Option<LogRecord> {
        match self {
            Stage::FixStack => Some(fix_stack(record)),
            Stage::AddLabels { default_context } => {
                Some(add_labels(record, default_context.as_deref()))
            }
            Stage::Custom(f) => f(record),
        }
    }
}

/// Ordered list of stages, composed once when the logger is built.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Standard pipeline: stack reconciliation, labels, then the optional
    /// user stage.
    pub fn new(default_context: Option<String>, custom: Option<FormatFn>) -> Self {
        let mut stages = vec![Stage::FixStack, Stage::AddLabels { default_context }];
        stages.extend(custom.map(Stage::Custom));
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn apply(&self, record: LogRecord) -> Option<LogRecord> {
        self.stages
            .iter()
            .try_fold(record, |record, stage| stage.apply(record))
    }
}

/// If an error record's stack already contains its message, replace the
/// message with the full stack and drop the separate stack.
pub fn fix_stack(mut record: LogRecord) -> LogRecord {
    if record.level != Level::Error {
        return record;
    }

    let embedded = record
        .stack
        .as_deref()
        .map_or(false, |stack| stack.contains(record.message.as_str()));
    if embedded {
        if let Some(stack) = record.stack.take() {
            record.message = stack;
        }
    }

    record
}

/// Resolve the record's context against `default_context` and rewrite
/// `labels["context"]` from scratch.
pub fn add_labels(mut record: LogRecord, default_context: Option<&str>) -> LogRecord {
    let context = record
        .context
        .take()
        .or_else(|| default_context.map(str::to_string));

    record.labels.remove("context");
    if let Some(context) = context {
        record.labels.insert("context".to_string(), context);
    }

    record
}
