//! Logging initialization
//!
//! Filter precedence: `RUST_LOG`, then the configured filter, then
//! [`DEFAULT_LOG_FILTER`]. Logs go to stderr (human-readable or JSON) and,
//! optionally, to [`log_path`] through a non-blocking appender.

use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{DEFAULT_LOG_FILTER, LogConfig, log_path};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to create log directory: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs the global subscriber.
///
/// Returns the file writer guard when file logging is enabled; logs are
/// flushed when it is dropped, so the caller keeps it alive until exit.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = build_filter(config.filter.as_deref());

    let stderr_layer = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(std::env::var_os("NO_COLOR").is_none())
            .with_writer(io::stderr)
            .boxed()
    };

    let (file_layer, guard) = if config.file {
        let path = log_path();
        let dir = path.parent().map(|p| p.to_path_buf()).unwrap_or_default();
        std::fs::create_dir_all(&dir)?;
        let file_name = path.file_name().unwrap_or_default();
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, file_name));
        let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

fn build_filter(filter: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn build_filter_uses_config_when_rust_log_is_unset() {
        // SAFETY: serialized with other environment-mutating tests.
        unsafe { std::env::remove_var("RUST_LOG") };

        assert_eq!(
            build_filter(Some("modfetch=debug")).to_string(),
            "modfetch=debug"
        );
        assert_eq!(build_filter(None).to_string(), DEFAULT_LOG_FILTER);
    }

    #[test]
    #[serial]
    fn build_filter_prefers_rust_log() {
        // SAFETY: serialized with other environment-mutating tests.
        unsafe { std::env::set_var("RUST_LOG", "warn") };
        let filter = build_filter(Some("modfetch=debug")).to_string();
        unsafe { std::env::remove_var("RUST_LOG") };

        assert_eq!(filter, "warn");
    }
}
