use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use gcloud_logger::layer::LoggerLayer;
use gcloud_logger::{Logger, LoggerConfig};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Buffer {
    type Writer = Buffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_logger<F: FnOnce()>(f: F) -> String {
    let out = Buffer::default();
    let config = LoggerConfig {
        color: false,
        ..LoggerConfig::default()
    };
    let logger = Logger::with_writer("Auth", &config, out.clone());
    let subscriber = Registry::default().with(LoggerLayer::new(logger));
    tracing::subscriber::with_default(subscriber, f);
    out.contents()
}

#[test]
fn events_use_bound_context() {
    let text = with_logger(|| tracing::info!("starting service"));
    assert!(text.contains("INFO     [Auth] starting service"), "got {:?}", text);
}

#[test]
fn context_field_overrides_and_fields_become_args() {
    let text = with_logger(|| tracing::warn!(context = "Tokens", remaining = 3, "pool low"));
    assert!(text.contains("[Tokens] pool low"), "got {:?}", text);
    assert!(text.contains("\"remaining\": 3"));
}

#[test]
fn debug_events_respect_threshold() {
    let text = with_logger(|| {
        tracing::debug!("noise");
        tracing::trace!("more noise");
    });
    assert!(text.is_empty());
}

#[test]
fn stack_field_is_reconciled() {
    let stack = "Error: boom\n  at f (x.js:1:1)";
    let text = with_logger(|| tracing::error!(stack = stack, "boom"));
    assert_eq!(text.matches("Error: boom").count(), 1);
    assert!(text.contains("ERROR    [Auth] Error: boom\n  at f (x.js:1:1)"), "got {:?}", text);
}

#[test]
fn stack_below_error_keeps_bound_context() {
    let stack = "Error: boom\n  at f (x.js:1:1)";
    let text = with_logger(|| tracing::warn!(stack = stack, "boom"));
    assert!(text.contains("WARN     [Auth] boom\n"), "got {:?}", text);
    assert!(!text.contains("[Error: boom"));
    assert!(text.contains("\"stack\": \"Error: boom\\n  at f (x.js:1:1)\""));
}

#[test]
fn display_recorded_stack_is_extracted() {
    let stack = "Error: boom\n  at f (x.js:1:1)";
    let text = with_logger(|| tracing::error!(stack = %stack, "request failed"));
    assert!(text.ends_with("ERROR    [Auth] request failed\nError: boom\n  at f (x.js:1:1)\n"), "got {:?}", text);
    assert!(!text.contains("\"stack\""));
}

#[test]
fn debug_recorded_stack_is_extracted() {
    let stack = "Error: boom\n  at f (x.js:1:1)";
    let text = with_logger(|| tracing::error!(stack = ?stack, "boom"));
    assert_eq!(text.matches("Error: boom").count(), 1);
    assert!(text.contains("ERROR    [Auth] Error: boom\n  at f (x.js:1:1)"), "got {:?}", text);
}
