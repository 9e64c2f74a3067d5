use chrono::{DateTime, NaiveDate, Utc};

/// Format a number the way the snapshot's JSON consumers display it:
/// integral values without a fractional part, everything else in its
/// shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        // Normalizes -0
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// Format a snapshot timestamp as an RFC 7231 date in GMT
/// (e.g. "Mon, 01 Jan 2024 00:00:00 GMT").
/// Returns the input unchanged if it cannot be parsed.
pub fn fmt_utc(iso: &str) -> String {
    const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

    if let Ok(dt) = DateTime::parse_from_rfc3339(iso.trim()) {
        dt.with_timezone(&Utc).format(HTTP_DATE).to_string()
    } else if let Ok(date) = NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d") {
        // Date-only timestamps are midnight UTC
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().format(HTTP_DATE).to_string())
            .unwrap_or_else(|| iso.to_string())
    } else {
        iso.to_string()
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(72.0), "72");
        assert_eq!(format_number(17.25), "17.25");
        assert_eq!(format_number(-3.5), "-3.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_fmt_utc() {
        assert_eq!(fmt_utc("2024-01-01T00:00:00Z"), "Mon, 01 Jan 2024 00:00:00 GMT");
        assert_eq!(fmt_utc("2024-03-01T08:30:00+02:00"), "Fri, 01 Mar 2024 06:30:00 GMT");
        assert_eq!(fmt_utc("2024-01-01"), "Mon, 01 Jan 2024 00:00:00 GMT");
        assert_eq!(fmt_utc("yesterday"), "yesterday"); // Unparsable, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Risk-off • 72", 11), "Risk-off...");
    }
}
