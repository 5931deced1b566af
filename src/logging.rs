//! Log setup: plain `timestamp LEVEL message` lines appended to the log file,
//! mirrored to stdout.

use std::path::Path;

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init(log_file: &Path) -> Result<WorkerGuard> {
    let file_name = log_file
        .file_name()
        .ok_or_else(|| anyhow!("log file path {} has no file name", log_file.display()))?;
    let log_dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(log_dir)?;
    let (file_writer, guard) = non_blocking(rolling::never(log_dir, file_name));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(false)
        .with_ansi(false);
    let console_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    Ok(guard)
}
