//! Timestamp parsing and formatting.

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

/// API timestamp, keeping the offset it was reported with.
pub type Timestamp = DateTime<FixedOffset>;

/// Parse an RFC 3339 timestamp (`2024-06-01T00:00:00Z`).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

/// Format a timestamp the way the API reports it; a zero offset renders as `Z`.
pub fn format_timestamp(at: &Timestamp) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// `YYYYMMDD_HHMM` stamp for export file names.
pub fn file_stamp(at: &DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_and_format_preserve_api_text() {
        let raw = "2024-06-01T00:00:00Z";
        let parsed = parse_timestamp(raw).unwrap();
        assert_eq!(format_timestamp(&parsed), raw);
    }

    #[test]
    fn test_parse_keeps_fraction_and_offset() {
        let raw = "2024-06-01T09:00:00.250+09:00";
        let parsed = parse_timestamp(raw).unwrap();
        assert_eq!(format_timestamp(&parsed), raw);
        assert_eq!(parsed, parse_timestamp("2024-06-01T00:00:00.250Z").unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_file_stamp() {
        let at = Local.with_ymd_and_hms(2025, 3, 9, 7, 5, 0).unwrap();
        assert_eq!(file_stamp(&at), "20250309_0705");
    }
}
