use clap::Args;
use serde::Deserialize;

use crate::config::LoggingSettings;

/// Logging flags shared by every command
#[derive(Debug, Clone, Default, Args, Deserialize)]
pub struct LoggingConfig {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    #[serde(skip)]
    pub verbose: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", env = "AUDITSWEEP_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log filter directives
    #[arg(long = "log-filter", env = "AUDITSWEEP_LOG_FILTER", global = true)]
    pub log_filter: Option<String>,
}

impl LoggingConfig {
    pub fn get_effective_level(&self) -> &str {
        match (self.verbose, self.log_level.as_deref()) {
            (v, _) if v >= 2 => "trace", // -vv flag
            (1, _) => "debug",           // -v flag
            (0, Some(level)) => level,   // Configured level
            _ => "info",                 // Default
        }
    }

    /// Fill unset flags from the configuration file
    ///
    /// A level given on the command line outranks the file's filter.
    pub fn with_settings(mut self, settings: &LoggingSettings) -> Self {
        let level_from_flags = self.verbose > 0 || self.log_level.is_some();
        if self.log_level.is_none() {
            self.log_level = settings.level.clone();
        }
        if self.log_filter.is_none() && !level_from_flags {
            self.log_filter = settings.filter.clone();
        }
        self
    }

    /// `EnvFilter` directives: `--log-filter` if given, else both crates at the effective level
    pub fn filter_directives(&self) -> String {
        match self.log_filter.as_deref() {
            Some(filter) => filter.to_string(),
            None => {
                let level = self.get_effective_level();
                format!("auditsweep_core={level},auditsweep={level}")
            }
        }
    }
}
