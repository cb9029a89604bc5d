//! Logging Infrastructure
//!
//! Structured logging setup for development and production:
//! - console layer with `RUST_LOG`-style filtering
//! - optional daily rotating file layer under `<work_dir>/logs`

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console-only logging (tests, local development).
pub fn init_logger(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logger: {e}"))?;

    Ok(())
}

/// Initialize logging with an additional daily-rolling file layer.
///
/// Returns the appender guard; dropping it stops the background writer, so
/// the caller keeps it alive for the process lifetime.
pub fn init_logger_with_file(
    default_level: &str,
    json_format: bool,
    log_dir: &Path,
) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "checkout.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer();

    if json_format {
        let file_layer = fmt::layer().json().with_ansi(false).with_writer(non_blocking);
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to init logger: {e}"))?;
    } else {
        let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to init logger: {e}"))?;
    }

    Ok(guard)
}
