//! Sets up the global logger.

use std::{fs::OpenOptions, path::Path, sync::Arc};

use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// The log level used when `RUST_LOG` is not set.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Install the global tracing subscriber.
///
/// Logs are written to stderr, filtered by the `RUST_LOG` environment variable
/// (`info` by default). If `log_file` is given, debug logs are also appended
/// to that file.
///
/// # Errors
/// Returns an error if `log_file` cannot be opened.
///
/// # Panics
/// Panics if a global subscriber has already been installed.
pub fn setup_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let debug_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(debug_log)
        .init();

    Ok(())
}
