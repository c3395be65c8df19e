use clap::Args;

use super::RangeArgs;

/// Print the windows a date range is split into
#[derive(Debug, Clone, Args)]
pub struct PlanCommand {
    #[command(flatten)]
    pub range: RangeArgs,
}
