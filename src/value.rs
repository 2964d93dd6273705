use serde::Serialize;
use serde_json::Value;

/// Error object passed at a call site.
///
/// Carries the error's display message and, when the caller captured one,
/// a stack trace in the `Name: message\n    at file:line:col` shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Build from any [`std::error::Error`], using its `Display` output as
    /// the message. Rust errors carry no stack, so `stack` stays empty.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        Self::new(err.to_string())
    }
}

/// One call-site argument of a leveled log call.
///
/// The first argument of a call is the message; the rest are free-form.
/// Strings are kept apart from other JSON values because a trailing string
/// is consumed as the record's context.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Str(String),
    Error(ErrorValue),
    Json(Value),
}

impl LogValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LogValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce to message text.
    pub fn to_message(&self) -> String {
        match self {
            LogValue::Str(s) => s.clone(),
            LogValue::Error(err) => err.message.clone(),
            LogValue::Json(Value::Null) => String::new(),
            LogValue::Json(v) => v.to_string(),
        }
    }

    /// Convert to a JSON value for the record's `args`.
    pub fn into_json(self) -> Value {
        match self {
            LogValue::Str(s) => Value::String(s),
            LogValue::Error(err) => serde_json::to_value(err).unwrap_or(Value::Null),
            LogValue::Json(v) => v,
        }
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Str(s.to_string())
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Str(s)
    }
}

impl From<&String> for LogValue {
    fn from(s: &String) -> Self {
        LogValue::Str(s.clone())
    }
}

impl From<Value> for LogValue {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => LogValue::Str(s),
            other => LogValue::Json(other),
        }
    }
}

impl From<ErrorValue> for LogValue {
    fn from(err: ErrorValue) -> Self {
        LogValue::Error(err)
    }
}

macro_rules! json_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for LogValue {
                fn from(v: $t) -> Self {
                    LogValue::Json(Value::from(v))
                }
            }
        )*
    };
}

json_from!(bool, i32, i64, u32, u64, f64);

/// Build a `Vec<LogValue>` from heterogeneous call-site arguments.
///
/// ```
/// use gcloud_logger::values;
/// use serde_json::json;
///
/// let args = values!["a", json!({ "x": 1 }), "Ctx"];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::value::LogValue>::new()
    };
    ($($v:expr),+ $(,)?) => {
        ::std::vec![$($crate::value::LogValue::from($v)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_strings_become_str() {
        assert_eq!(LogValue::from(json!("ctx")), LogValue::Str("ctx".into()));
        assert!(matches!(LogValue::from(json!({"x": 1})), LogValue::Json(_)));
    }

    #[test]
    fn message_coercion() {
        assert_eq!(LogValue::from(42i64).to_message(), "42");
        assert_eq!(LogValue::from(json!({"a": true})).to_message(), r#"{"a":true}"#);
        assert_eq!(LogValue::Json(Value::Null).to_message(), "");
        assert_eq!(LogValue::from(ErrorValue::new("boom")).to_message(), "boom");
    }

    #[test]
    fn error_serializes_without_empty_stack() {
        let v = LogValue::from(ErrorValue::new("boom")).into_json();
        assert_eq!(v, json!({"name": "Error", "message": "boom"}));
    }

    #[test]
    fn from_std_error_uses_display() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert_eq!(ErrorValue::from_error(&io).message, "disk gone");
    }

    #[test]
    fn values_macro_accepts_mixed_types() {
        let v = values!["msg", 3i64, json!([1, 2])];
        assert_eq!(v[0], LogValue::Str("msg".into()));
        assert_eq!(v[1], LogValue::Json(json!(3)));
        assert!(values![].is_empty());
    }
}
