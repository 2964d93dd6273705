use std::io::Write;

use chrono::Local;
use console::Style;
use serde_json::{Map, Value};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

use crate::level::Level;
use crate::record::LogRecord;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Console-only formatting steps, applied in the order of
/// [`CONSOLE_STAGES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStage {
    Timestamp,
    UppercaseLevel,
    ContextPrefix,
    Colorize,
    PadLevels,
}

pub const CONSOLE_STAGES: [ConsoleStage; 5] = [
    ConsoleStage::Timestamp,
    ConsoleStage::UppercaseLevel,
    ConsoleStage::ContextPrefix,
    ConsoleStage::Colorize,
    ConsoleStage::PadLevels,
];

/// Display state of a record while it moves through the console stages.
#[derive(Debug, Clone)]
pub struct ConsoleLine {
    pub timestamp: String,
    pub level: String,
    pub message: String,
    pub stack: Option<String>,
    /// Fields not consumed by the line itself: `args` and user fields.
    pub rest: Map<String, Value>,
    source_level: Level,
    context: Option<String>,
}

impl ConsoleLine {
    fn new(record: &LogRecord) -> Self {
        let mut rest = Map::new();
        if !record.args.is_empty() {
            rest.insert("args".to_string(), Value::Array(record.args.clone()));
        }
        for (key, value) in &record.fields {
            rest.insert(key.clone(), value.clone());
        }

        Self {
            timestamp: String::new(),
            level: record.level.as_str().to_string(),
            message: record.message.clone(),
            stack: record.stack.clone(),
            rest,
            source_level: record.level,
            context: record.context_label().map(str::to_string),
        }
    }

    /// `"<timestamp>: <LEVEL> <message>"`, then the pretty JSON of `rest`
    /// and the stack, each on their own lines when present.
    pub fn render(&self) -> String {
        let mut output = format!("{}: {} {}", self.timestamp, self.level, self.message);

        if !self.rest.is_empty() {
            if let Ok(json) = serde_json::to_string_pretty(&self.rest) {
                output.push('\n');
                output.push_str(&json);
            }
        }

        if let Some(stack) = &self.stack {
            output.push('\n');
            output.push_str(stack);
        }

        output
    }
}

/// Human-readable line formatter for terminal output.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleFormat {
    color: bool,
}

impl ConsoleFormat {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn render(&self, record: &LogRecord) -> String {
        CONSOLE_STAGES
            .iter()
            .fold(ConsoleLine::new(record), |line, stage| {
                self.apply(*stage, line, record)
            })
            .render()
    }

    fn apply(&self, stage: ConsoleStage, mut line: ConsoleLine, record: &LogRecord) -> ConsoleLine {
        match stage {
            ConsoleStage::Timestamp => {
                line.timestamp = record
                    .timestamp
                    .with_timezone(&Local)
                    .format(TIMESTAMP_FORMAT)
                    .to_string();
            }
            ConsoleStage::UppercaseLevel => {
                line.level = line.level.to_uppercase();
            }
            ConsoleStage::ContextPrefix => {
                if let Some(context) = &line.context {
                    let tag = self.style(Style::new().dim()).apply_to(format!("[{}]", context));
                    line.message = format!("{} {}", tag, line.message);
                }
            }
            ConsoleStage::Colorize => {
                let style = self.style(level_style(line.source_level));
                line.level = style.apply_to(&line.level).to_string();
                line.message = style.apply_to(&line.message).to_string();
            }
            ConsoleStage::PadLevels => {
                // longest name + 1 minus this name, in front of the message
                let width = Level::max_name_len() + 1;
                let padding = width.saturating_sub(line.source_level.as_str().len());
                line.message = format!("{}{}", " ".repeat(padding), line.message);
            }
        }
        line
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.color)
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::Error => Style::new().red(),
        Level::Warn => Style::new().yellow(),
        Level::Info => Style::new().green(),
        Level::Verbose => Style::new().cyan(),
        Level::Debug => Style::new().blue(),
    }
}

/// Transport that renders records with [`ConsoleFormat`] and writes one
/// line per record, synchronously.
pub struct ConsoleTransport {
    format: ConsoleFormat,
    writer: BoxMakeWriter,
}

impl ConsoleTransport {
    /// Write to the process's standard output.
    pub fn new(color: bool) -> Self {
        Self::with_writer(color, std::io::stdout)
    }

    pub fn with_writer<W>(color: bool, make_writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self {
            format: ConsoleFormat::new(color),
            writer: BoxMakeWriter::new(make_writer),
        }
    }

    pub fn format(&self) -> &ConsoleFormat {
        &self.format
    }

    pub fn emit(&self, record: &LogRecord) {
        let line = self.format.render(record);
        let mut writer = self.writer.make_writer();
        // console writes are best effort, like any other stdout write
        let _ = writeln!(writer, "{}", line);
    }
}
