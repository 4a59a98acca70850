//! src/logging.rs
//! ============================================================================
//! # Logging: File-Backed Tracing Pipeline
//!
//! Installs the global tracing subscriber. Everything goes to a daily-rolled
//! file under the resolved log directory; nothing is written to the terminal,
//! which belongs to the UI for the whole life of the process. `RUST_LOG`
//! overrides the configured level directive.

use std::path::Path;

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, fmt::time::ChronoUtc, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::AppError;

const LOG_FILE_PREFIX: &str = "handoff";
const MAX_LOG_FILES: usize = 10;

/// Installs the tracing subscriber and returns the appender guard.
///
/// The guard must be held until process exit or buffered log lines are lost.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<WorkerGuard, AppError> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .map_err(|e| AppError::logging(format!("failed to create file appender: {e}")))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AppError::logging(format!("invalid log level directive '{level}': {e}")))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::logging(format!("failed to install tracing subscriber: {e}")))?;

    Ok(guard)
}
