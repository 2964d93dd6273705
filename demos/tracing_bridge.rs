use gcloud_logger::init::init_tracing;
use gcloud_logger::{create_logger, LoggerOptions};
use tracing::{error, info, warn};

fn main() {
    let logger = create_logger(LoggerOptions::new().context("Auth")).expect("build logger");
    init_tracing(logger);

    info!("starting service");
    warn!(context = "Tokens", remaining = 3, "token pool running low");
    error!(user_id = 42, reason = "invalid password", "authentication failed");
}
