//! Date parsing and formatting shared by JSON requests and CSV rows

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Parse a date as sent by clients.
///
/// Accepts RFC 3339 (`2024-03-01T09:30:00Z`, with any offset), a naive
/// timestamp (`2024-03-01T09:30:00`, taken as UTC) or a bare calendar date
/// (`2024-03-01`, taken as midnight UTC). Surrounding whitespace is ignored.
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a timestamp so that [`parse_datetime`] returns the same instant
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_accepted_forms() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-03-01"), Some(midnight));
        assert_eq!(parse_datetime(" 2024-03-01T00:00:00Z "), Some(midnight));
        assert_eq!(parse_datetime("2024-03-01T00:00:00"), Some(midnight));
        assert_eq!(
            parse_datetime("2024-03-01T02:00:00+02:00"),
            Some(midnight)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("   "), None);
        assert_eq!(parse_datetime("next tuesday"), None);
        assert_eq!(parse_datetime("2024-13-40"), None);
    }

    #[test]
    fn test_format_is_exact() {
        let precise = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(parse_datetime(&format_datetime(&precise)), Some(precise));

        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(format_datetime(&whole), "2024-03-01T12:00:00Z");
    }
}
