use chrono::{DateTime, Utc};

use crate::normalize::title_case_label;

/// `2024-03-01T12:30:00Z` -> `2024-03-01 12:30` (UTC). Missing or
/// unparseable input renders as a dash so tables stay aligned.
pub fn format_datetime(value: Option<&str>) -> String {
    match value.and_then(|v| DateTime::parse_from_rfc3339(v).ok()) {
        Some(parsed) => parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "-".to_string(),
    }
}

/// `upgrade_required` -> `Upgrade Required`.
pub fn format_status(status: &str) -> String {
    title_case_label(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetimes_render_in_utc_minutes() {
        assert_eq!(
            format_datetime(Some("2024-03-01T12:30:45Z")),
            "2024-03-01 12:30"
        );
        assert_eq!(
            format_datetime(Some("2024-03-01T12:30:45+02:00")),
            "2024-03-01 10:30"
        );
    }

    #[test]
    fn bad_datetimes_render_as_dash() {
        assert_eq!(format_datetime(None), "-");
        assert_eq!(format_datetime(Some("")), "-");
        assert_eq!(format_datetime(Some("yesterday")), "-");
    }

    #[test]
    fn statuses_read_as_words() {
        assert_eq!(format_status("queued"), "Queued");
        assert_eq!(format_status("upgrade_required"), "Upgrade Required");
    }
}
