pub mod config;
pub mod fetch;
pub mod plan;

pub use config::LoggingConfig;
pub use fetch::FetchCommand;
pub use plan::PlanCommand;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::{Args, Subcommand};

use crate::retrieval::RetrievalParams;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the windows a date range is split into
    Plan(PlanCommand),
    /// Retrieve every record of a date range
    Fetch(FetchCommand),
}

/// Date range and window width
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// Start of the range (RFC 3339, "YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DD"; default: retention floor)
    #[arg(long, value_parser = parse_timestamp)]
    pub start: Option<DateTime<Utc>>,

    /// End of the range, exclusive (default: now)
    #[arg(long, value_parser = parse_timestamp)]
    pub end: Option<DateTime<Utc>>,

    /// Window width in minutes
    #[arg(long = "interval-minutes", value_name = "MINUTES")]
    pub interval_minutes: Option<i64>,
}

impl RangeArgs {
    /// Apply these flags on top of configured parameters
    pub fn apply(&self, params: &mut RetrievalParams) {
        params.start = self.start;
        params.end = self.end;
        if let Some(minutes) = self.interval_minutes {
            params.interval_minutes = minutes;
        }
    }
}

/// Parse a UTC timestamp in one of the accepted formats
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Some(naive) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(format!(
        "invalid timestamp '{}': expected RFC 3339, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD'",
        value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 2, 13, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-02T13:30:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-02T15:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-02 13:30:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-05-02").unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("yesterday").is_err());
    }
}
