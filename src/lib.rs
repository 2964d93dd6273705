pub mod level;
pub mod value;
pub mod record;
pub mod normalize;
pub mod format;
pub mod console;
pub mod sink;
pub mod cloud;

#[cfg(feature = "gcloud")]
pub mod gcloud;

pub mod env;
pub mod config;
pub mod error;
pub mod logger;
pub mod layer;
pub mod init;
pub mod noop_sink;

pub use config::{LoggerConfig, TransportKind};
pub use error::LoggerError;
pub use level::Level;
pub use logger::{create_logger, Logger, LoggerOptions};
pub use record::LogRecord;
pub use value::{ErrorValue, LogValue};
