//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Transfer Console
//!
//! This module defines the error enum (`AppError`) used across the application.
//! Each variant carries enough context for diagnostics, and the fallible
//! modules are expected to use `Result<T, Self>` for consistency. Remote
//! directory failures have their own type ([`crate::directory::DirectoryError`])
//! because they travel through the action channel; everything that happens
//! on the way to a running UI lands here.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for console startup and configuration.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Platform config/data directory could not be resolved.
    #[error("Could not determine a {kind} directory for this platform")]
    ProjectDirs { kind: &'static str },

    /// The configured directory endpoint is not a usable base URL.
    #[error("Invalid directory endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Tracing/log pipeline setup failure.
    #[error("Logging setup error: {0}")]
    Logging(String),

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    /// Create an endpoint validation error
    pub fn invalid_endpoint<S1: Into<String>, S2: Into<String>>(url: S1, reason: S2) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a logging setup error
    pub fn logging<S: Into<String>>(message: S) -> Self {
        Self::Logging(message.into())
    }
}
