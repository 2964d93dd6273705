use crate::level::Level;
use crate::logger::Logger;
use crate::value::LogValue;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that forwards every `tracing` event to a
/// [`Logger`].
///
/// The event's `message` becomes the record message, a `context` field
/// becomes the explicit context and a `stack` field is passed as a stack
/// trace. Every other field lands in one JSON object argument.
pub struct LoggerLayer {
    logger: Logger,
}

impl LoggerLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn into_logger(self) -> Logger {
        self.logger
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = Level::from(*event.metadata().level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.logger.log_at(level, visitor.into_values(level));
    }
}

/// Collects the fields of one event into call-site arguments.
#[derive(Default)]
pub struct FieldVisitor {
    message: Option<String>,
    context: Option<String>,
    stack: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    /// Arguments in call-site order: message, stack, fields, context.
    ///
    /// Below error level the stack is not extracted, so it travels inside
    /// the fields object and can never be taken for the context.
    pub fn into_values(mut self, level: Level) -> Vec<LogValue> {
        let mut values = vec![LogValue::Str(self.message.unwrap_or_default())];
        if let Some(stack) = self.stack {
            if level == Level::Error {
                values.push(LogValue::Str(stack));
            } else {
                self.fields.insert("stack".to_string(), Value::String(stack));
            }
        }
        if !self.fields.is_empty() {
            values.push(LogValue::Json(Value::Object(self.fields)));
        }
        if let Some(context) = self.context {
            values.push(LogValue::Str(context));
        }
        values
    }

    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "context" => self.context = Some(value.to_string()),
            "stack" => self.stack = Some(value.to_string()),
            _ => self.insert(field, Value::String(value.to_string())),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{:?}", value)),
            "context" => self.context = Some(debug_text(value)),
            "stack" => self.stack = Some(debug_text(value)),
            _ => self.insert(field, Value::String(format!("{:?}", value))),
        }
    }
}

/// Text of a `Debug` value, unquoting and unescaping string literals so a
/// `?`-recorded `&str` reads the same as a `%`-recorded one.
fn debug_text(value: &dyn std::fmt::Debug) -> String {
    let text = format!("{:?}", value);
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        serde_json::from_str::<String>(&text).unwrap_or_else(|_| text[1..text.len() - 1].to_string())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STACK: &str = "Error: boom\n  at f (x.js:1:1)";

    #[test]
    fn stack_stays_out_of_trailing_position_below_error() {
        let visitor = FieldVisitor {
            message: Some("boom".into()),
            stack: Some(STACK.into()),
            ..FieldVisitor::default()
        };
        let values = visitor.into_values(Level::Warn);
        assert_eq!(values.len(), 2);
        assert!(matches!(values.last(), Some(LogValue::Json(_))));
    }

    #[test]
    fn stack_is_forwarded_as_string_at_error() {
        let visitor = FieldVisitor {
            message: Some("boom".into()),
            stack: Some(STACK.into()),
            context: Some("Ctx".into()),
            ..FieldVisitor::default()
        };
        let values = visitor.into_values(Level::Error);
        assert_eq!(values[1], LogValue::Str(STACK.into()));
        assert_eq!(values.last(), Some(&LogValue::Str("Ctx".into())));
    }

    #[test]
    fn debug_text_unescapes_quoted_strings() {
        assert_eq!(debug_text(&STACK), STACK);
        assert_eq!(debug_text(&format_args!("{}", STACK)), STACK);
        assert_eq!(debug_text(&42), "42");
    }
}
