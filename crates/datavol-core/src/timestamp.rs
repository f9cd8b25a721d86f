use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Error, Result};

/// Parse a registry (`2024-01-02T00:00:00.123456Z`) or HTTP-date
/// (`Mon, 01 Jan 2024 00:00:00 GMT`) timestamp into UTC.
///
/// Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(Error::InvalidTimestamp {
        value: value.to_owned(),
    })
}

/// `YYYYmmdd HH:MM:SS`, the layout used in comparison logs.
pub fn display(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%d %H:%M:%S").to_string()
}
