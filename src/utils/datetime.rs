use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use anyhow::{anyhow, Result};

/// Accepted start time input, e.g. `20:00 06.10.2017` or `9:00 6.10.2017`.
pub const START_TIME_INPUT_FORMAT: &str = "%H:%M %d.%m.%Y";

const START_TIME_DISPLAY_FORMAT: &str = "%-H:%M %-d.%m.%Y";

pub fn parse_start_time(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), START_TIME_INPUT_FORMAT)
        .map_err(|_| anyhow!("'{}' is not a start time like 20:00 06.10.2017", input.trim()))
}

pub fn format_start_time(start: &NaiveDateTime) -> String {
    start.format(START_TIME_DISPLAY_FORMAT).to_string()
}

/// Converts a wall-clock start time in a `UTC+offset` zone to a UTC instant.
pub fn start_instant(local: NaiveDateTime, utc_offset_hours: i32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(local - Duration::hours(i64::from(utc_offset_hours))))
}

/// Wall-clock time in a `UTC+offset` zone at instant `at`.
pub fn local_time(at: DateTime<Utc>, utc_offset_hours: i32) -> NaiveDateTime {
    at.naive_utc() + Duration::hours(i64::from(utc_offset_hours))
}
