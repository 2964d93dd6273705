use std::sync::OnceLock;

use regex::Regex;

use crate::level::Level;
use crate::record::LogRecord;
use crate::value::LogValue;

static STACK_REGEX: OnceLock<Regex> = OnceLock::new();

fn stack_regex() -> &'static Regex {
    STACK_REGEX.get_or_init(|| {
        // message line immediately followed by an indented `at file:line:col` frame
        Regex::new(r"^(.)+\n\s+at .+:\d+:\d+").expect("Failed to compile stack regex")
    })
}

/// Returns `true` if `s` looks like a captured stack trace.
pub fn is_stack(s: &str) -> bool {
    stack_regex().is_match(s)
}

/// Turn the raw arguments of one leveled call into a [`LogRecord`].
///
/// - error level only: the first string argument shaped like a stack
///   trace is removed from the arguments and becomes `stack`;
/// - the first remaining argument is the message;
/// - a trailing string argument is consumed as the explicit context;
/// - anything left over becomes `args`.
///
/// Missing values degrade to an empty message, no context and no stack.
pub fn normalize(level: Level, values: Vec<LogValue>) -> LogRecord {
    let mut values = values;
    let mut stack = None;

    if level == Level::Error {
        let found = values
            .iter()
            .position(|v| v.as_str().map_or(false, is_stack));
        if let Some(pos) = found {
            if let LogValue::Str(s) = values.remove(pos) {
                stack = Some(s);
            }
        }
    }

    let mut rest = values.into_iter();
    let first = rest.next();
    let mut rest: Vec<LogValue> = rest.collect();

    let message = first.as_ref().map(LogValue::to_message).unwrap_or_default();
    let mut record = LogRecord::new(level, message);

    if let Some(LogValue::Error(err)) = first {
        if level == Level::Error && err.stack.is_some() {
            stack = err.stack;
        }
    }

    if let Some(LogValue::Str(_)) = rest.last() {
        if let Some(LogValue::Str(context)) = rest.pop() {
            record.context = Some(context);
        }
    }

    record.args = rest.into_iter().map(LogValue::into_json).collect();
    record.stack = stack;
    record
}
