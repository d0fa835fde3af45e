use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d/%m/%Y"];

/// Parses a feedback timestamp from any of the export formats seen in the
/// wild. Returns `None` for blank or unrecognized values.
///
/// Offsets in RFC 3339 values are dropped after conversion to UTC so every
/// record compares on the same naive clock.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_iso() {
        assert_eq!(parse_timestamp("2024-01-05 15:45:00"), Some(ymd_hms(2024, 1, 5, 15, 45)));
        assert_eq!(parse_timestamp("2024-01-05T15:45:00"), Some(ymd_hms(2024, 1, 5, 15, 45)));
        assert_eq!(parse_timestamp("2024-01-05"), Some(ymd_hms(2024, 1, 5, 0, 0)));
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        assert_eq!(
            parse_timestamp("2024-01-05T16:45:00+01:00"),
            Some(ymd_hms(2024, 1, 5, 15, 45))
        );
    }

    #[test]
    fn test_parse_notion_export_style() {
        assert_eq!(
            parse_timestamp("January 5, 2024 3:45 PM"),
            Some(ymd_hms(2024, 1, 5, 15, 45))
        );
        assert_eq!(parse_timestamp("March 12, 2024"), Some(ymd_hms(2024, 3, 12, 0, 0)));
    }

    #[test]
    fn test_parse_day_first() {
        assert_eq!(parse_timestamp("05/01/2024 15:45"), Some(ymd_hms(2024, 1, 5, 15, 45)));
    }

    #[test]
    fn test_unparsable_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("last tuesday"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }
}
