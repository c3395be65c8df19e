use clap::Args;
use std::path::PathBuf;

use super::RangeArgs;
use crate::retrieval::RetrievalParams;

/// Retrieve every record of a date range
#[derive(Debug, Clone, Args)]
pub struct FetchCommand {
    /// NDJSON capture to serve queries from
    #[arg(long, value_name = "FILE")]
    pub source: PathBuf,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Records requested per page (1-5000)
    #[arg(long = "result-size")]
    pub result_size: Option<usize>,

    /// Per-session record cap (1-50000)
    #[arg(long = "session-size")]
    pub session_size: Option<u64>,

    /// Empty responses tolerated per window
    #[arg(long = "retry-limit")]
    pub retry_limit: Option<u32>,

    /// Windows drained at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Emit decoded payloads instead of raw records
    #[arg(long)]
    pub decode: bool,

    /// Write records here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl FetchCommand {
    /// Apply these flags on top of configured parameters
    pub fn apply(&self, params: &mut RetrievalParams) {
        self.range.apply(params);
        if let Some(size) = self.result_size {
            params.result_size = size;
        }
        if let Some(size) = self.session_size {
            params.session_size = size;
        }
        if let Some(limit) = self.retry_limit {
            params.retry_limit = limit;
        }
        if let Some(concurrency) = self.concurrency {
            params.max_concurrent_windows = concurrency;
        }
    }
}
