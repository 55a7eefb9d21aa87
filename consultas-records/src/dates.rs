//! Date parsing and display for consultation timestamps.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use consultas_core::RawRecord;

use crate::fields::{first_text, DATE_FIELDS};

/// Shown when a consultation carries no date at all.
pub const MISSING_DATE: &str = "Fecha no disponible";

const DATE_FORMAT: &str = "%Y-%m-%d";
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Digits accepted after the decimal point of an ISO timestamp.
const MAX_FRACTION_DIGITS: usize = 6;

/// Parse a timestamp trying, in order: ISO-8601 with fractional seconds and a
/// literal `Z`, `YYYY-MM-DD HH:MM:SS`, then a bare `YYYY-MM-DD` at midnight.
///
/// The fraction is mandatory: `2024-01-15T10:00:00Z` matches none of the
/// shapes and yields `None`.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    parse_iso(value)
        .or_else(|| NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).ok())
        .or_else(|| parse_day(value).map(|day| day.and_time(NaiveTime::MIN)))
}

fn parse_iso(value: &str) -> Option<NaiveDateTime> {
    let (_, fraction) = value.strip_suffix('Z')?.rsplit_once('.')?;
    let digits_only = fraction.bytes().all(|byte| byte.is_ascii_digit());
    if fraction.is_empty() || fraction.len() > MAX_FRACTION_DIGITS || !digits_only {
        return None;
    }
    NaiveDateTime::parse_from_str(value, ISO_FORMAT).ok()
}

/// `DD/MM/YYYY HH:MM`, or the input unchanged when it does not parse.
pub fn format_date(value: &str) -> String {
    match parse_date(value) {
        Some(moment) => moment.format("%d/%m/%Y %H:%M").to_string(),
        None => value.to_string(),
    }
}

/// Strict `YYYY-MM-DD`, the format callers use for report ranges.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// `DD/MM/YYYY` for a `YYYY-MM-DD` input, or the input unchanged.
pub fn format_day(value: &str) -> String {
    match parse_day(value) {
        Some(day) => day.format("%d/%m/%Y").to_string(),
        None => value.to_string(),
    }
}

/// First date candidate that parses. An unparseable candidate does not hide
/// a later, valid one.
pub fn resolve_date(record: &RawRecord) -> Option<NaiveDateTime> {
    DATE_FIELDS
        .iter()
        .filter_map(|field| record.text(field))
        .find_map(parse_date)
}

/// Display form of the first non-empty date candidate.
pub fn display_date(record: &RawRecord) -> String {
    first_text(record, DATE_FIELDS)
        .map(|raw| format_date(&raw))
        .unwrap_or_else(|| MISSING_DATE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_every_supported_shape() {
        assert_eq!(
            parse_date("2024-03-05T14:30:00.250Z").map(|dt| dt.date()),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(
            parse_date("2024-03-05 14:30:00"),
            Some(at(2024, 3, 5, 14, 30, 0))
        );
        assert_eq!(parse_date("2024-03-05"), Some(at(2024, 3, 5, 0, 0, 0)));
    }

    #[test]
    fn iso_timestamps_need_a_fraction() {
        assert_eq!(
            parse_date("2024-01-15T10:00:00.5Z"),
            Some(at(2024, 1, 15, 10, 0, 0) + chrono::Duration::milliseconds(500))
        );
        assert_eq!(
            parse_date("2024-01-15T10:00:00.123456Z").map(|dt| dt.date()),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(parse_date("2024-01-15T10:00:00Z"), None);
        assert_eq!(parse_date("2024-01-15T10:00:00.Z"), None);
        assert_eq!(parse_date("2024-01-15T10:00:00.1234567Z"), None);
        assert_eq!(parse_date("2024-01-15T10:00:00.250"), None);
        assert_eq!(format_date("2024-01-15T10:00:00Z"), "2024-01-15T10:00:00Z");
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert_eq!(parse_date("bad-date"), None);
        assert_eq!(parse_date("05/03/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn format_degrades_to_input() {
        assert_eq!(format_date("2024-03-05 14:30:00"), "05/03/2024 14:30");
        assert_eq!(format_date("2024-03-05"), "05/03/2024 00:00");
        assert_eq!(format_date("ayer"), "ayer");
        assert_eq!(format_day("2024-01-31"), "31/01/2024");
        assert_eq!(format_day("31-01-2024"), "31-01-2024");
    }

    #[test]
    fn later_candidate_rescues_bad_earlier_one() {
        let record = RawRecord::new(json!({"fecha": "pronto", "created_at": "2024-02-10"}));
        assert_eq!(resolve_date(&record), Some(at(2024, 2, 10, 0, 0, 0)));
        assert_eq!(display_date(&record), "pronto");
    }

    #[test]
    fn missing_date_has_placeholder() {
        let record = RawRecord::new(json!({"fecha": ""}));
        assert_eq!(resolve_date(&record), None);
        assert_eq!(display_date(&record), MISSING_DATE);
    }
}
