//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver (directories only)
//!
//! Manages all user-editable settings for the transfer console. Loads and
//! saves settings as TOML from the proper cross-platform config path using
//! the [`directories`](https://docs.rs/directories) crate.
//!
//! ## Features
//! - XDG-compliant config discovery and writing (Linux, macOS, Windows)
//! - Robust defaulting if no config file exists
//! - Async load/save for smooth integration with Tokio
//! - An explicit `--config` path bypasses discovery entirely
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load(None).await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::error::AppError;

/// Connection settings for the remote directory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the directory service.
    pub base_url: String,

    /// Deadline for a single typeahead user search.
    #[serde(with = "humantime_serde")]
    pub search_timeout: Duration,

    /// Deadline for contact searches and transfer submissions.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Upper bound on typeahead hits requested per search.
    pub max_hits: usize,

    /// Upper bound on contacts returned by a contact search.
    pub max_contacts: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".to_string(),
            search_timeout: Duration::from_millis(5000),
            request_timeout: Duration::from_secs(30),
            max_hits: 8,
            max_contacts: 200,
        }
    }
}

/// Behavior knobs for the interactive surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Minimum typed characters before a typeahead search is issued.
    pub min_query_len: usize,

    /// How many page messages are kept before the oldest is dropped.
    pub max_messages: usize,

    /// How many filter criteria rows the form may hold.
    pub max_criteria_rows: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            min_query_len: 1,
            max_messages: 4,
            max_criteria_rows: 5,
        }
    }
}

/// Log pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default directive for the `EnvFilter` (overridden by `RUST_LOG`).
    pub level: String,

    /// Log directory; `None` resolves to the platform data dir.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads config from a TOML file, or returns defaults.
    ///
    /// With an explicit path (`--config`), the file must exist and parse.
    /// Without one, the config is expected at the XDG-compliant app config
    /// dir (`$XDG_CONFIG_HOME/handoff/config.toml` on Linux, or equivalent
    /// on Windows/macOS) and is created with defaults on first run.
    pub async fn load(override_path: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = override_path {
            info!("Loading config from {}", path.display());
            let text =
                TokioFs::read_to_string(path)
                    .await
                    .map_err(|source| AppError::ConfigIo {
                        path: path.to_path_buf(),
                        source,
                    })?;
            return Ok(toml::from_str(&text)?);
        }

        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(&path)
                .await
                .map_err(|source| AppError::ConfigIo {
                    path: path.clone(),
                    source,
                })?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Saves config to the TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> Result<(), AppError> {
        let path = Self::config_path()?;

        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("org", "handoff", "handoff")
            .ok_or(AppError::ProjectDirs { kind: "config" })?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Resolves the log directory: configured dir, or `<data dir>/logs`.
    pub fn log_dir(&self) -> Result<PathBuf, AppError> {
        if let Some(dir) = &self.logging.dir {
            return Ok(dir.clone());
        }
        let proj_dirs = ProjectDirs::from("org", "handoff", "handoff")
            .ok_or(AppError::ProjectDirs { kind: "data" })?;
        Ok(proj_dirs.data_local_dir().join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_page_behavior() {
        let config = Config::default();

        assert_eq!(config.remote.search_timeout, Duration::from_millis(5000));
        assert_eq!(config.remote.request_timeout, Duration::from_secs(30));
        assert_eq!(config.ui.min_query_len, 1);
        assert!(config.ui.max_criteria_rows >= 1);
    }

    #[test]
    fn test_partial_config_fills_missing_sections() {
        let cfg: Config = toml::from_str(
            r#"
            [remote]
            base_url = "https://directory.internal:9443"
            search_timeout = "2s"
            request_timeout = "10s"
            max_hits = 5
            max_contacts = 50
            "#,
        )
        .unwrap();

        assert_eq!(cfg.remote.base_url, "https://directory.internal:9443");
        assert_eq!(cfg.remote.search_timeout, Duration::from_secs(2));
        // [ui] and [logging] were absent and must come from defaults
        assert_eq!(cfg.ui.max_messages, 4);
        assert_eq!(cfg.logging.level, "info");
    }

    #[tokio::test]
    async fn test_explicit_path_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");

        let mut config = Config::default();
        config.remote.max_hits = 3;
        config.logging.level = "debug".to_string();
        let text = toml::to_string_pretty(&config).unwrap();
        TokioFs::write(&path, text).await.unwrap();

        let loaded = Config::load(Some(&path)).await.unwrap();
        assert_eq!(loaded.remote.max_hits, 3);
        assert_eq!(loaded.logging.level, "debug");
    }

    #[tokio::test]
    async fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = Config::load(Some(&missing)).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigIo { .. }));
    }
}
