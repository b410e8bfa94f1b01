//! Shared utility functions for figwatch crates.

pub mod date_range;

/// Date utility functions
pub mod dates {
    use chrono::{Duration, NaiveDate};
    use regex::Regex;
    use std::sync::LazyLock;

    /// Canonical calendar date format: "YYYY-MM-DD"
    pub const ISO_FORMAT: &str = "%Y-%m-%d";

    /// Days behind today at which the weather archive stops serving data.
    pub const ARCHIVE_LAG_DAYS: i64 = 7;

    /// `YYYY-M-D` or `YYYY/M/D`, one or two digit month and day.
    static ISO_LIKE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})$").unwrap());

    /// `D/M/Y` or `D-M-Y`, day first, two or four digit year.
    static DAY_FIRST: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([0-9]{1,2})[-/]([0-9]{1,2})[-/]([0-9]{4}|[0-9]{2})$").unwrap());

    /// `DDMMYYYY` with no separators.
    static COMPACT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([0-9]{2})([0-9]{2})([0-9]{4})$").unwrap());

    /// Normalize loosely formatted date text into `YYYY-MM-DD`.
    ///
    /// Forms are tried in order and the first one whose shape matches decides
    /// the result:
    ///
    /// 1. `YYYY-M-D` / `YYYY/M/D`, rejected unless it names a real calendar day
    /// 2. `D/M/YYYY` / `D-M-YY`, two digit years map to `20YY`
    /// 3. `DDMMYYYY`
    ///
    /// A trailing time component after a space is ignored, so
    /// `"2023-10-01 12:00:00"` normalizes to `"2023-10-01"`.
    ///
    /// Forms 2 and 3 are not checked against the calendar here and may return
    /// text such as `"2024-02-31"`. Use [`parse_date`] when a real date is needed.
    pub fn normalize_date_text(input: &str) -> Option<String> {
        let text = input.trim().split(' ').next()?;
        if text.is_empty() {
            return None;
        }

        if let Some(caps) = ISO_LIKE.captures(text) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)?;
            return Some(format!("{}-{:02}-{:02}", &caps[1], month, day));
        }

        if let Some(caps) = DAY_FIRST.captures(text) {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let year = match &caps[3] {
                yy if yy.len() == 2 => format!("20{yy}"),
                yyyy => yyyy.to_string(),
            };
            return Some(format!("{year}-{month:02}-{day:02}"));
        }

        if let Some(caps) = COMPACT.captures(text) {
            return Some(format!("{}-{}-{}", &caps[3], &caps[2], &caps[1]));
        }

        None
    }

    /// Parse loosely formatted date text into a real calendar date.
    ///
    /// Same accepted forms as [`normalize_date_text`], but text that does not
    /// name an existing day (`31/02/2024`, `01132023`) is rejected.
    pub fn parse_date(input: &str) -> Option<NaiveDate> {
        let normalized = normalize_date_text(input)?;
        NaiveDate::parse_from_str(&normalized, ISO_FORMAT).ok()
    }

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(ISO_FORMAT).to_string()
    }

    /// The last day the weather archive can serve relative to `today`.
    pub fn weather_cutoff(today: NaiveDate) -> NaiveDate {
        today - Duration::days(ARCHIVE_LAG_DAYS)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn test_three_forms_agree() {
            assert_eq!(normalize_date_text("2023-10-01").as_deref(), Some("2023-10-01"));
            assert_eq!(normalize_date_text("01/10/2023").as_deref(), Some("2023-10-01"));
            assert_eq!(normalize_date_text("01102023").as_deref(), Some("2023-10-01"));
        }

        #[test]
        fn test_iso_like_padding_and_separators() {
            assert_eq!(normalize_date_text("2023/1/5").as_deref(), Some("2023-01-05"));
            assert_eq!(normalize_date_text("2023-1/05").as_deref(), Some("2023-01-05"));
        }

        #[test]
        fn test_iso_like_rejects_impossible_dates() {
            assert_eq!(normalize_date_text("2023-13-40"), None);
            assert_eq!(normalize_date_text("2023-02-29"), None);
            assert_eq!(normalize_date_text("2024-02-29").as_deref(), Some("2024-02-29"));
        }

        #[test]
        fn test_day_first_two_digit_year() {
            assert_eq!(normalize_date_text("5/3/24").as_deref(), Some("2024-03-05"));
            assert_eq!(normalize_date_text("05-03-99").as_deref(), Some("2099-03-05"));
        }

        #[test]
        fn test_day_first_is_not_calendar_checked() {
            assert_eq!(normalize_date_text("31/02/2024").as_deref(), Some("2024-02-31"));
            assert_eq!(parse_date("31/02/2024"), None);
        }

        #[test]
        fn test_time_component_is_stripped() {
            assert_eq!(
                normalize_date_text("2023-10-01 12:00:00").as_deref(),
                Some("2023-10-01")
            );
            assert_eq!(
                normalize_date_text("  01/10/2023 08:15 ").as_deref(),
                Some("2023-10-01")
            );
        }

        #[test]
        fn test_unrecognized_text() {
            for text in ["", "   ", "Date", "2023-10", "1/2/3", "123456789", "01-Oct-2023"] {
                assert_eq!(normalize_date_text(text), None, "input {text:?}");
            }
        }

        #[test]
        fn test_normalized_output_is_fixed_point() {
            let inputs = [
                "2023-10-01",
                "2023/2/28",
                "1/10/2023",
                "15-06-22",
                "29022024",
                "2024-02-29 23:59",
            ];
            for input in inputs {
                let once = normalize_date_text(input).unwrap();
                let twice = normalize_date_text(&once);
                assert_eq!(twice.as_deref(), Some(once.as_str()), "input {input:?}");
            }
        }

        #[test]
        fn test_parse_date() {
            let expected = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
            assert_eq!(parse_date("01102023"), Some(expected));
            assert_eq!(parse_date("13012023"), NaiveDate::from_ymd_opt(2023, 1, 13));
            assert_eq!(parse_date("01132023"), None);
        }

        #[test]
        fn test_weather_cutoff() {
            let today = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
            assert_eq!(weather_cutoff(today), NaiveDate::from_ymd_opt(2024, 2, 25).unwrap());
        }

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2023-06-15");
            assert_eq!(parse_date(&formatted), Some(date));
        }
    }
}
