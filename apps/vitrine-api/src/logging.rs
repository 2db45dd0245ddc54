//! Structured logging setup using tracing.
//!
//! JSON output is the default so logs can be shipped to an aggregator as-is.
//! `pretty` gives human-readable output for local runs.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
///
/// # Panics
///
/// Panics if the subscriber has already been initialized.
pub fn init_logging(config: &LoggingConfig) {
    let filter_layer =
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level)) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("FATAL: Failed to create log filter: {e}");
                std::process::exit(1);
            }
        };

    let registry = tracing_subscriber::registry().with(filter_layer);

    if config.format.eq_ignore_ascii_case("pretty") {
        registry.with(fmt::layer().pretty().with_target(true)).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(true)
                    .with_line_number(true)
                    .flatten_event(true),
            )
            .init();
    }

    tracing::info!(level = %config.level, format = %config.format, "Logging initialized");
}
