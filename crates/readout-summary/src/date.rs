//! Published-date display.
//!
//! Pages report their publication date in whatever format their metadata
//! uses. Recognised formats are shown as `Tue, 4 Jun 2024, 3:05 pm` in the
//! date's own offset; anything else is shown as given.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Shown when a page has no usable date.
pub const UNKNOWN_DATE: &str = "Unknown";

const DISPLAY_FORMAT: &str = "%a, %-d %b %Y, %-I:%M %P";

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Format a raw published date for the summary panel.
pub fn format_published_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(UNKNOWN_DATE) {
        return UNKNOWN_DATE.to_string();
    }

    if let Some(parsed) = parse_with_offset(raw) {
        return parsed.format(DISPLAY_FORMAT).to_string();
    }
    if let Some(parsed) = parse_naive(raw) {
        return parsed.format(DISPLAY_FORMAT).to_string();
    }

    tracing::debug!(raw, "Unrecognised published date, showing as-is");
    raw.to_string()
}

fn parse_with_offset(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_dates() {
        assert_eq!(format_published_date(""), "Unknown");
        assert_eq!(format_published_date("  "), "Unknown");
        assert_eq!(format_published_date("unknown"), "Unknown");
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            format_published_date("2024-06-04T15:05:00Z"),
            "Tue, 4 Jun 2024, 3:05 pm"
        );
        assert_eq!(
            format_published_date("2024-06-04T09:30:00+02:00"),
            "Tue, 4 Jun 2024, 9:30 am"
        );
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            format_published_date("Fri, 13 Dec 2019 23:45:00 +0000"),
            "Fri, 13 Dec 2019, 11:45 pm"
        );
    }

    #[test]
    fn test_naive_formats() {
        assert_eq!(format_published_date("2023-01-02"), "Mon, 2 Jan 2023, 12:00 am");
        assert_eq!(
            format_published_date("2023-01-02 07:08:09"),
            "Mon, 2 Jan 2023, 7:08 am"
        );
    }

    #[test]
    fn test_unparseable_kept() {
        assert_eq!(format_published_date("last Tuesday"), "last Tuesday");
    }
}
