//! Configuration management for auditsweep.
//!
//! This module provides configuration handling through multiple sources:
//! 1. Default configuration (embedded in binary)
//! 2. System-wide configuration file (`/etc/auditsweep/config.toml`)
//! 3. User-specified configuration file
//! 4. Environment variables (prefixed with `AUDITSWEEP_`, sections split by `__`)
//! 5. Command-line arguments
//!
//! Configuration options are loaded in order of precedence, with later sources
//! overriding earlier ones.
//!
//! # Environment Variables
//!
//! - `AUDITSWEEP_RETRIEVAL__INTERVAL_MINUTES` - Window width in minutes
//! - `AUDITSWEEP_RETRIEVAL__RESULT_SIZE` - Records requested per page
//! - `AUDITSWEEP_RETRIEVAL__RETRY_LIMIT` - Empty responses tolerated per window
//! - `AUDITSWEEP_LOGGING__LEVEL` - Default log level

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{defaults, limits};
use crate::error::Result;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");
const SYSTEM_CONFIG: &str = "/etc/auditsweep/config.toml";

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Retrieval tunables
    #[serde(default)]
    pub retrieval: RetrievalSettings,
    /// Logging defaults
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Retrieval tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Width of each window in minutes
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: i64,
    /// Records requested per page (1..=5000)
    #[serde(default = "default_result_size")]
    pub result_size: usize,
    /// Per-session record cap (1..=50000)
    #[serde(default = "default_session_size")]
    pub session_size: u64,
    /// Empty responses tolerated per window
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    /// How far back the default start date reaches
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// Upper bound on one query call in seconds
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    /// Windows drained concurrently
    #[serde(default = "default_max_concurrent_windows")]
    pub max_concurrent_windows: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            result_size: default_result_size(),
            session_size: default_session_size(),
            retry_limit: default_retry_limit(),
            lookback_days: default_lookback_days(),
            query_timeout_secs: default_query_timeout_secs(),
            max_concurrent_windows: default_max_concurrent_windows(),
        }
    }
}

/// Logging defaults, overridable from the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
    /// Log filter directives
    #[serde(default)]
    pub filter: Option<String>,
}

impl Settings {
    /// Load configuration from all file and environment sources
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::with_name(SYSTEM_CONFIG).required(false));

        // Load user config if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path));
        }

        // Add environment variables
        builder = builder.add_source(
            config::Environment::with_prefix("AUDITSWEEP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Load only the embedded defaults
    pub fn embedded() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

fn default_interval_minutes() -> i64 {
    defaults::INTERVAL_MINUTES
}

fn default_result_size() -> usize {
    defaults::RESULT_SIZE
}

fn default_session_size() -> u64 {
    defaults::SESSION_SIZE
}

fn default_retry_limit() -> u32 {
    defaults::RETRY_LIMIT
}

fn default_lookback_days() -> i64 {
    limits::MAX_LOOKBACK_DAYS
}

fn default_query_timeout_secs() -> u64 {
    defaults::QUERY_TIMEOUT_SECS
}

fn default_max_concurrent_windows() -> usize {
    defaults::MAX_CONCURRENT_WINDOWS
}
