use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse scraped date text with a site's `strftime` pattern.
///
/// Patterns with an offset keep it; patterns without one are read as UTC,
/// and date-only patterns land on midnight. Anything unparseable is `None`.
pub fn parse_date(raw: &str, format: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() || format.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_str(raw, format) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(raw, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_only() {
        assert_eq!(
            parse_date("2024-03-05", "%Y-%m-%d"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_date_and_time() {
        assert_eq!(
            parse_date(" 05 Mar 2024 14:30 ", "%d %b %Y %H:%M"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_offset_converted_to_utc() {
        assert_eq!(
            parse_date("2024-03-05 08:00:00 +0800", "%Y-%m-%d %H:%M:%S %z"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_date("yesterday", "%Y-%m-%d"), None);
        assert_eq!(parse_date("2024-13-40", "%Y-%m-%d"), None);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(parse_date("", "%Y-%m-%d"), None);
        assert_eq!(parse_date("2024-03-05", ""), None);
    }
}
