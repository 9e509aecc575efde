//! Lenient parsing of the date strings people type into spreadsheets.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats that start with the year. Only tried when the first number has four digits, since `%Y`
/// reads `1/5/24` as the year 1.
const YEAR_FIRST_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Other date-only formats, tried in order. Month-first wins over day-first for slash dates, and
/// the two-digit year must come before `%Y`, which would otherwise read `25` as the year 25.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y", "%m/%d/%Y", "%d.%m.%Y", "%b %d, %Y", "%B %d, %Y", "%d %b %Y", "%d %B %Y",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Parses `s` into a calendar date. Returns `None` when nothing matches; callers treat that as a
/// missing date rather than an error.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let formats = if starts_with_year(s) {
        YEAR_FIRST_FORMATS
    } else {
        DATE_FORMATS
    };
    if let Some(date) = formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Some(date);
    }
    if let Some(dt) = DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn starts_with_year(s: &str) -> bool {
    s.split(['/', '-'])
        .next()
        .is_some_and(|first| first.len() == 4 && first.bytes().all(|b| b.is_ascii_digit()))
}

/// The `YYYY-MM` key used for monthly aggregation.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso() {
        assert_eq!(parse_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date(" 2024/02/03 "), Some(ymd(2024, 2, 3)));
    }

    #[test]
    fn test_us_style() {
        assert_eq!(parse_date("10/20/2025"), Some(ymd(2025, 10, 20)));
        assert_eq!(parse_date("10/1/25"), Some(ymd(2025, 10, 1)));
        assert_eq!(parse_date("1/5/24"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("12/31/99"), Some(ymd(1999, 12, 31)));
    }

    #[test]
    fn test_short_first_number_is_never_a_year() {
        assert_eq!(parse_date("10/1/2025"), Some(ymd(2025, 10, 1)));
        assert_eq!(parse_date("25/1/10"), None);
        assert_eq!(parse_date("0024/01/05"), Some(ymd(24, 1, 5)));
    }

    #[test]
    fn test_written_month() {
        assert_eq!(parse_date("Jan 5, 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("February 29, 2024"), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_date("5 March 2024"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_date_times() {
        assert_eq!(parse_date("2024-03-01 13:45:00"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date("2024-03-01T08:00:00Z"), Some(ymd(2024, 3, 1)));
        assert_eq!(
            parse_date("10/21/2025 9:15:30 AM"),
            Some(ymd(2025, 10, 21))
        );
    }

    #[test]
    fn test_unparsable() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(ymd(2024, 2, 29)), "2024-02");
    }
}
