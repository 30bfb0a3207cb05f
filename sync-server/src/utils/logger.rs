//! Logging Infrastructure
//!
//! Structured logging setup for development and production

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, prelude::*};

/// Initialize the logging system.
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn"); `RUST_LOG`
///   takes precedence when set
/// * `json_format` - JSON output for production, pretty for development
pub fn init_logger(level: &str, json_format: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_format {
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true);
        subscriber.with(console_layer).init();
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true);
        subscriber.with(console_layer).init();
    }
}
