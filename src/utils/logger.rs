use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Initializes tracing for applications embedding the client.
///
/// Safe to call more than once; later calls are no-ops. Applications that
/// already installed their own subscriber can skip this entirely, since the
/// client only ever emits through the `tracing` facade.
pub fn init_logging(logging_config: &LoggingConfig) {
    // Parse level string -> LevelFilter, falling back to `info` rather than
    // refusing to start over a typo.
    let level_filter = match logging_config.level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    };

    // This can be used to allow env-based overrides, plus the default:
    let filter_layer = EnvFilter::default().add_directive(level_filter.into());

    // Route `log`-based records from dependencies through tracing as well.
    let _ = tracing_log::LogTracer::init();

    let result = match logging_config.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().json())
            .try_init(),
        // Human-readable console output; also the fallback for unknown formats.
        _ => tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().pretty())
            .try_init(),
    };
    let _ = result;
}
