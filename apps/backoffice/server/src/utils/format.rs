//! Display formatting shared by the API views.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::regex::{SLUG_SEPARATOR_REGEX, UNSAFE_FILE_CHARS_REGEX};

/// `Jan 05, 2025`
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %d, %Y").to_string()
}

/// `Jan 05, 2025 14:30`
pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.format("%b %d, %Y %H:%M").to_string()
}

/// Parse a stored date or timestamp (`YYYY-MM-DD`, RFC 3339, or SQLite's
/// `YYYY-MM-DD HH:MM:SS`).
pub fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Format a stored date column for display, `None` when empty or unparseable.
pub fn format_stored_date(raw: Option<&str>) -> Option<String> {
    raw.and_then(parse_stored_date)
        .map(|d| d.format("%b %d, %Y").to_string())
}

/// Two decimals with thousands separators, e.g. `12,500.00`.
pub fn number_format(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed.trim_matches(|c| c == '0' || c == '.') != "" {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{frac_part}")
}

/// Money column for display; zero and missing both render as `None`.
pub fn format_money(value: Option<f64>) -> Option<String> {
    value.filter(|v| *v != 0.0).map(number_format)
}

/// Human readable size: `512 B`, `1.5 KB`, `2.25 MB`.
pub fn format_file_size(bytes: i64) -> Option<String> {
    if bytes <= 0 {
        return None;
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size > 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let rounded = (size * 100.0).round() / 100.0;
    Some(format!("{} {}", rounded, UNITS[unit]))
}

/// Upper-case the first character only.
pub fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// URL slug: lower-case ASCII words joined by `-`.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    SLUG_SEPARATOR_REGEX
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Strip everything but `[A-Za-z0-9._-]` from an uploaded file name.
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_FILE_CHARS_REGEX.replace_all(name, "").to_string()
}

/// Last path segment of a stored file path.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 5, 14, 30, 0).unwrap();
        assert_eq!(format_date(&dt), "Jan 05, 2025");
        assert_eq!(format_date_time(&dt), "Jan 05, 2025 14:30");
    }

    #[test]
    fn test_format_stored_date_accepts_several_shapes() {
        assert_eq!(format_stored_date(Some("2025-03-09")).as_deref(), Some("Mar 09, 2025"));
        assert_eq!(
            format_stored_date(Some("2025-03-09T08:00:00+00:00")).as_deref(),
            Some("Mar 09, 2025")
        );
        assert_eq!(
            format_stored_date(Some("2025-03-09 08:00:00")).as_deref(),
            Some("Mar 09, 2025")
        );
        assert_eq!(format_stored_date(Some("soon")), None);
        assert_eq!(format_stored_date(None), None);
    }

    #[test]
    fn test_number_format() {
        assert_eq!(number_format(0.0), "0.00");
        assert_eq!(number_format(999.5), "999.50");
        assert_eq!(number_format(12500.0), "12,500.00");
        assert_eq!(number_format(1234567.891), "1,234,567.89");
        assert_eq!(number_format(-1500.0), "-1,500.00");
        assert_eq!(format_money(Some(0.0)), None);
        assert_eq!(format_money(Some(15.0)).as_deref(), Some("15.00"));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), None);
        assert_eq!(format_file_size(512).as_deref(), Some("512 B"));
        assert_eq!(format_file_size(1536).as_deref(), Some("1.5 KB"));
        assert_eq!(format_file_size(5 * 1024 * 1024).as_deref(), Some("5 MB"));
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(ucfirst("confirmed"), "Confirmed");
        assert_eq!(ucfirst(""), "");
        assert_eq!(slugify("  Boracay: 3D/2N Tour!  "), "boracay-3d-2n-tour");
        assert_eq!(sanitize_file_name("Terms & Conditions 2025.pdf"), "TermsConditions2025.pdf");
        assert_eq!(basename("terms_conditions/1700000000_terms.pdf"), "1700000000_terms.pdf");
    }
}
