//! Logging configuration.
//!
//! Sets up tracing-based logging to stderr, with an optional daily-rolling
//! log file in the config directory so long scans leave a record behind.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Log level can be controlled via the `MEDIADEX_LOG` environment variable
/// (falling back to `RUST_LOG`):
/// - `MEDIADEX_LOG=debug` for verbose output
/// - `MEDIADEX_LOG=info` for standard output (default)
/// - `MEDIADEX_LOG=warn` for warnings and errors only
///
/// `verbose` lowers the default level to debug when no filter is set.
pub fn init(verbose: bool, log_dir: Option<PathBuf>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_env("MEDIADEX_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    if let Some(log_dir) = log_dir {
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = tracing_appender::rolling::daily(&log_dir, "mediadex.log");
        let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

        // Store the guard in a static to prevent it from being dropped
        // This is safe because we only call init() once at startup
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(_guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}
