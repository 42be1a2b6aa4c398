//! Coercion of raw text cells into typed values.
//!
//! Raw snapshots encode numbers and timestamps as text. Anything that does not
//! coerce cleanly becomes `None` rather than an error.

use chrono::NaiveDateTime;

/// Output format for timestamps written back to tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const MISSING_MARKERS: [&str; 5] = ["NA", "N/A", "NaN", "nan", "null"];

/// Returns the trimmed cell, or `None` for empty cells.
pub fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parses an ISO-like timestamp (`YYYY-MM-DD HH:MM[:SS[.f]]`, `T` separator allowed).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Parses a numeric cell, treating the usual missing markers as `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a boolean cell (`true`/`false`, `1`/`0`, case-insensitive).
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Normalizes a station identifier.
///
/// Identifiers that passed through a float column come back as `"8000105.0"`;
/// the trailing `.0` is stripped so they join against integer renderings.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        return None;
    }
    match trimmed.strip_suffix(".0") {
        Some(integral) if !integral.is_empty() && integral.bytes().all(|b| b.is_ascii_digit()) => {
            Some(integral.to_string())
        }
        _ => Some(trimmed.to_string()),
    }
}

/// Lookup key for station names: trimmed and lowercased.
pub fn normalize_station_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Signed difference `later - earlier` in minutes.
pub fn minutes_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    (later - earlier).num_seconds() as f64 / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 16)
            .unwrap()
            .and_hms_opt(6, 44, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-07-16 06:44:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-07-16T06:44:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-07-16 06:44"), Some(expected));
        assert_eq!(parse_timestamp(" 2024-07-16 06:44:00.000 "), Some(expected));
        assert_eq!(parse_timestamp("16.07.2024 06:44"), None);
    }

    #[test]
    fn test_parse_number_missing_markers() {
        assert_eq!(parse_number("3.5"), Some(3.5));
        assert_eq!(parse_number("-2"), Some(-2.0));
        assert_eq!(parse_number("NA"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("late"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("8000105.0").as_deref(), Some("8000105"));
        assert_eq!(normalize_identifier(" 8000105 ").as_deref(), Some("8000105"));
        assert_eq!(normalize_identifier("DE-1.0").as_deref(), Some("DE-1.0"));
        assert_eq!(normalize_identifier("NA"), None);
    }

    #[test]
    fn test_normalize_station_name() {
        assert_eq!(
            normalize_station_name("  Frankfurt (Main) Hbf ").as_deref(),
            Some("frankfurt (main) hbf")
        );
        assert_eq!(normalize_station_name("   "), None);
    }

    #[test]
    fn test_minutes_between_is_signed() {
        let a = parse_timestamp("2024-07-16 06:44:00").unwrap();
        let b = parse_timestamp("2024-07-16 07:14:30").unwrap();
        assert_eq!(minutes_between(a, b), 30.5);
        assert_eq!(minutes_between(b, a), -30.5);
    }
}
