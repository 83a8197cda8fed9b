//! Time utilities: naive local wall-clock parsing and formatting.
//!
//! All timestamps in this system are naive local time; timezone and DST
//! handling are out of scope.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};

/// Format used in the `start` / `due` columns.
pub const STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format shown to the user ("03/04/24 09:00 AM").
pub const DISPLAY_FORMAT: &str = "%m/%d/%y %I:%M %p";

/// Accepted input/legacy formats, tried in order.
const PARSE_FORMATS: [&str; 3] = [STORE_FORMAT, "%Y-%m-%d %H:%M", DISPLAY_FORMAT];

/// Parse a timestamp in any accepted format. Used both for CLI input and
/// for stored rows written by older versions.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in PARSE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    anyhow::bail!(
        "invalid date/time '{s}' (expected e.g. '2024-03-04 09:00' or '03/04/24 09:00 AM')"
    )
}

/// Parse a bare date like "2024-03-13" or "03/13/24".
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d", "%m/%d/%y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    anyhow::bail!("invalid date '{s}' (expected e.g. '2024-03-13' or '03/13/24')")
}

pub fn format_stored(dt: NaiveDateTime) -> String {
    dt.format(STORE_FORMAT).to_string()
}

pub fn format_display(dt: NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_and_display_forms() {
        let a = parse_datetime("2024-03-04 09:00:00").unwrap();
        let b = parse_datetime("2024-03-04 09:00").unwrap();
        let c = parse_datetime("03/04/24 09:00 AM").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(parse_datetime("yesterday-ish").is_err());
    }

    #[test]
    fn round_trips_store_format() {
        let dt = parse_datetime("2024-03-04 17:30:00").unwrap();
        assert_eq!(format_stored(dt), "2024-03-04 17:30:00");
        assert_eq!(format_display(dt), "03/04/24 05:30 PM");
    }

    #[test]
    fn parses_dates() {
        assert_eq!(parse_date("2024-03-13").unwrap(), parse_date("03/13/24").unwrap());
        assert!(parse_date("13th").is_err());
    }
}
