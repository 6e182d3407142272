//! Calendar-date handling.
//!
//! Dates arrive as ISO strings (project files), spreadsheet serial numbers
//! (cells Excel typed as dates) or locale-formatted strings (hand-edited
//! workbooks). [`parse_date`] tries a fixed list of formats in order and
//! everything downstream works with [`NaiveDate`] rendered as ISO
//! `YYYY-MM-DD`.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

/// ISO output format.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-only formats, tried in order. Month-first wins for ambiguous
/// slash-separated dates.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Date-time formats; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Largest serial Excel accepts (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Today's date in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a date from any of the accepted spellings.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    // RFC 3339 with offset, e.g. "2024-05-01T00:00:00+02:00"
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    value.parse::<f64>().ok().and_then(from_serial)
}

/// Convert a spreadsheet serial (1900 date system) to a date.
///
/// The epoch is 1899-12-30, which absorbs the fictitious 1900-02-29: serials
/// from 61 (1900-03-01) onward map exactly. The fractional (time) part is
/// dropped.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Render a date as ISO `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Serde adapter for the project metadata date.
///
/// Accepts strings in any [`parse_date`] spelling or a serial number; an
/// empty or unreadable date falls back to today, matching how the tool
/// fills in a missing date when a file is opened.
pub mod lenient {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_date, from_serial, parse_date, today};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let parsed = match &value {
            serde_json::Value::String(text) => parse_date(text),
            serde_json::Value::Number(number) => number.as_f64().and_then(from_serial),
            _ => None,
        };
        Ok(parsed.unwrap_or_else(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso() {
        assert_eq!(parse_date("2025-03-14"), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date(" 2025-03-14 "), Some(ymd(2025, 3, 14)));
    }

    #[test]
    fn parses_iso_datetime() {
        assert_eq!(parse_date("2025-03-14 00:00:00"), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date("2025-03-14T08:30:00.000"), Some(ymd(2025, 3, 14)));
    }

    #[test]
    fn parses_spreadsheet_serial() {
        assert_eq!(parse_date("45000"), Some(ymd(2023, 3, 15)));
        assert_eq!(parse_date("45000.75"), Some(ymd(2023, 3, 15)));
        assert_eq!(from_serial(1.0), Some(ymd(1899, 12, 31)));
        assert_eq!(from_serial(0.0), None);
    }

    #[test]
    fn parses_locale_strings() {
        assert_eq!(parse_date("03/14/2025"), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date("14.03.2025"), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date("14 Mar 2025"), Some(ymd(2025, 3, 14)));
        assert_eq!(parse_date("March 14, 2025"), Some(ymd(2025, 3, 14)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn formats_iso() {
        assert_eq!(format_date(ymd(2025, 1, 2)), "2025-01-02");
    }
}
