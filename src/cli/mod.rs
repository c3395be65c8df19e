//! Command-line interface module.
//!
//! This module provides the CLI functionality for:
//! - Planning the windows of a date range
//! - Fetching records from a replay capture
//! - Logging configuration

pub mod commands;
pub mod handlers;
pub mod options;

pub use handlers::{handle_fetch, handle_plan, init_logging};
pub use options::Cli;
