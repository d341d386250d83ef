use chrono::{Local, NaiveDate};

pub type AppInstant = std::time::Instant;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: u128 = 1000;
    pub const MS_IN_MIN: u128 = Self::MS_IN_S * 60;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d";

    /// Parse a `YYYY-MM-DD` date (CLI arguments, cache rows).
    pub fn parse_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(text.trim(), Self::STANDARD_TIME_FORMAT)
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Compact elapsed time for log lines: "850ms", "12.4s", "3m 05s".
pub fn format_duration(ms: u128) -> String {
    if ms < TimeUtils::MS_IN_S {
        return format!("{}ms", ms);
    }
    if ms < TimeUtils::MS_IN_MIN {
        return format!("{:.1}s", ms as f64 / 1000.0);
    }
    let secs = ms / TimeUtils::MS_IN_S;
    format!("{}m {:02}s", secs / 60, secs % 60)
}
