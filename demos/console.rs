use gcloud_logger::{create_logger, values, ErrorValue};
use serde_json::json;

fn main() {
    let logger = create_logger("Svc").expect("build logger");

    logger.info(values!["started"]);
    logger.warn(values!["low disk", json!({ "free_mb": 120 }), "Disk"]);
    logger.debug(values!["hidden unless LOGGER_LEVEL=debug"]);

    let err = ErrorValue::new("boom").with_stack("Error: boom\n    at handler (src/handler.js:12:7)");
    logger.error(values![err]);

    if let Err(e) = logger.set_log_levels(&[]) {
        logger.warn(values![e.to_string()]);
    }
}
