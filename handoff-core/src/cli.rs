//! src/cli.rs
//! ============================================================================
//! # Cli: Command-Line Arguments
//!
//! Startup flags only. Everything else is config-file territory; a flag given
//! here wins over the corresponding config value for this run.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "handoff")]
#[command(about = "Mass-reassign CRM contacts between directory users")]
#[command(version)]
pub struct Cli {
    /// Explicit config file path (default: platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory service base URL, overriding the configured one
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Log directory, overriding the configured one
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Run against a built-in sample directory instead of a live service
    #[arg(long)]
    pub demo: bool,
}

impl Cli {
    /// Folds flag overrides into a loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.remote.base_url = endpoint.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.logging.dir = Some(dir.clone());
        }
    }
}
