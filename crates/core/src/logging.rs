use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// Mirror log lines on stderr.
    pub to_stderr: bool,
    /// Default to `debug` instead of `info` when `RUST_LOG` is unset.
    pub verbose: bool,
    /// Overrides `~/.ktdsl/logs`.
    pub dir: Option<PathBuf>,
}

pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ktdsl")
        .join("logs")
}

/// Installs the global subscriber writing to a daily rolling file named
/// after `component`.
///
/// The returned guard must stay alive for buffered lines to be flushed.
pub fn init_logging(component: &str, options: &LoggingOptions) -> WorkerGuard {
    let log_dir = options.dir.clone().unwrap_or_else(default_log_dir);
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if options.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let stderr_layer = options.to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    // A second initialization (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    guard
}
