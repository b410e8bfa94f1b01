//! Permissive parser for pasted spreadsheet cells and fetched CSV.
//!
//! Rows are `Date, Figs, Bats[, Leaves]`. Anything that does not fit (header
//! rows, notes, half-filled lines) is skipped rather than failing the batch.
//!
//! # Input
//!
//! The delimiter is chosen once per input: tab if the first non-blank line
//! contains one, comma otherwise. Both `\n` and `\r\n` line endings work.
//!
//! ```text
//! Date	Figs	Bats	Leaves
//! 01/10/2023	20	10
//! 02/10/2023	25	15	60
//! ```

use crate::observation::{round_intensity, sort_newest_first, Observation};
use csv::{ReaderBuilder, StringRecord, Trim};
use fig_utils::dates::parse_date;
use log::{debug, info};
use thiserror::Error;

/// Fewest fields a row needs to be considered: date, figs, bats.
pub const MIN_FIELDS: usize = 3;

/// Why a single row was left out of the result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("expected at least {min} fields, found {0}", min = MIN_FIELDS)]
    TooFewFields(usize),

    #[error("unreadable date {0:?}")]
    BadDate(String),

    #[error("{column} is not a number: {value:?}")]
    BadNumber { column: &'static str, value: String },

    #[error("malformed row: {0}")]
    Unreadable(String),
}

/// A row that was dropped, with its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: SkipReason,
}

/// Accepted records plus a diagnostic for every skipped row.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    /// Accepted rows, newest first
    pub records: Vec<Observation>,
    pub skipped: Vec<SkippedRow>,
}

/// Pick the field delimiter for a whole input.
pub fn detect_delimiter(text: &str) -> u8 {
    match text.lines().find(|line| !line.trim().is_empty()) {
        Some(line) if line.contains('\t') => b'\t',
        _ => b',',
    }
}

/// Parse delimited text into observations, newest first.
///
/// An empty result is a normal outcome meaning no usable rows were found.
pub fn parse_table(text: &str) -> Vec<Observation> {
    parse_table_report(text).records
}

/// Parse delimited text, keeping a record of every row that was skipped.
///
/// Each line is read on its own, so an unbalanced quote only spoils the row
/// it appears in.
pub fn parse_table_report(text: &str) -> ParseReport {
    let delimiter = detect_delimiter(text);
    // Pasted cells are plain text; only CSV exports use quoting.
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(delimiter)
        .quoting(delimiter == b',')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All);

    let mut report = ParseReport::default();
    for (index, row) in text.lines().enumerate() {
        if row.trim().is_empty() {
            continue;
        }
        let line = index as u64 + 1;
        let parsed = match builder.from_reader(row.as_bytes()).records().next() {
            Some(Ok(record)) => record_to_observation(&record),
            Some(Err(e)) => Err(SkipReason::Unreadable(e.to_string())),
            None => continue,
        };
        match parsed {
            Ok(obs) => report.records.push(obs),
            Err(reason) => {
                debug!("table parser: skipping line {}: {}", line, reason);
                report.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    sort_newest_first(&mut report.records);
    info!(
        "table parser: accepted {} rows, skipped {}",
        report.records.len(),
        report.skipped.len()
    );
    report
}

/// Coerce a numeric cell: blank is zero, decimals parse, anything else is invalid.
fn coerce_number(field: &str) -> Option<f64> {
    if field.is_empty() {
        return Some(0.0);
    }
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn record_to_observation(record: &StringRecord) -> Result<Observation, SkipReason> {
    if record.len() < MIN_FIELDS {
        return Err(SkipReason::TooFewFields(record.len()));
    }
    let date_field = &record[0];
    let date = parse_date(date_field).ok_or_else(|| SkipReason::BadDate(date_field.to_string()))?;
    let figs = coerce_number(&record[1]).ok_or_else(|| SkipReason::BadNumber {
        column: "figs",
        value: record[1].to_string(),
    })?;
    let bats = coerce_number(&record[2]).ok_or_else(|| SkipReason::BadNumber {
        column: "bats",
        value: record[2].to_string(),
    })?;
    let leaves = record.get(3).and_then(coerce_number).unwrap_or(0.0);

    Ok(Observation::new(
        date,
        round_intensity(figs),
        round_intensity(bats),
        round_intensity(leaves),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::export_csv;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn values(records: &[Observation]) -> Vec<(NaiveDate, i32, i32, i32)> {
        records
            .iter()
            .map(|o| (o.date, o.figs, o.bats, o.leaves))
            .collect()
    }

    #[test]
    fn test_tab_separated_rows() {
        let records = parse_table("01/10/2023\t20\t10\n02/10/2023\t25\t15");
        assert_eq!(
            values(&records),
            vec![(day(2023, 10, 2), 25, 15, 0), (day(2023, 10, 1), 20, 10, 0)]
        );
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn test_header_row_is_skipped() {
        let report = parse_table_report("Date\tFigs\tBats\n01/10/2023\t20\t10\r\n");
        assert_eq!(values(&report.records), vec![(day(2023, 10, 1), 20, 10, 0)]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::BadDate("Date".to_string()));
    }

    #[test]
    fn test_label_row_with_valid_date_is_skipped() {
        let records = parse_table("2023-10-01,n/a,10\n2023-10-02,5,6,7");
        assert_eq!(values(&records), vec![(day(2023, 10, 2), 5, 6, 7)]);
    }

    #[test]
    fn test_delimiter_detection() {
        assert_eq!(detect_delimiter("\n\n  \na\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a,b,c\nd\te\tf"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_comma_separated_with_crlf_and_quotes() {
        let text = "Date,Figs,Bats,Leaves\r\n2023-10-01,\"20\",10.6,\r\n\r\n2023-10-03,0,0,99.5\r\n";
        let records = parse_table(text);
        assert_eq!(
            values(&records),
            vec![(day(2023, 10, 3), 0, 0, 100), (day(2023, 10, 1), 20, 11, 0)]
        );
    }

    #[test]
    fn test_unbalanced_quote_only_drops_its_row() {
        let report =
            parse_table_report("2023-10-01,1,1\n\"oops note,2,2\n2023-10-03,3,3\n2023-10-04,4,4\n");
        assert_eq!(
            values(&report.records),
            vec![
                (day(2023, 10, 4), 4, 4, 0),
                (day(2023, 10, 3), 3, 3, 0),
                (day(2023, 10, 1), 1, 1, 0),
            ]
        );
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 2);
    }

    #[test]
    fn test_blank_numbers_are_zero_and_bad_leaves_default() {
        let records = parse_table("01102023\t\t\tmany\n");
        assert_eq!(values(&records), vec![(day(2023, 10, 1), 0, 0, 0)]);
    }

    #[test]
    fn test_short_rows_and_bad_dates_are_reported() {
        let report = parse_table_report("2023-10-01,1\n31/02/2024,1,2\nnot a date,1,2\n");
        assert!(report.records.is_empty());
        let reasons: Vec<SkipReason> = report.skipped.into_iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::TooFewFields(2),
                SkipReason::BadDate("31/02/2024".to_string()),
                SkipReason::BadDate("not a date".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_finite_numbers_are_invalid() {
        let records = parse_table("2023-10-01,NaN,1\n2023-10-02,inf,1\n2023-10-03,1,1");
        assert_eq!(values(&records), vec![(day(2023, 10, 3), 1, 1, 0)]);
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        assert!(parse_table("").is_empty());
        assert!(parse_table("Date\tFigs\tBats\n").is_empty());
    }

    #[test]
    fn test_time_suffix_in_date_cell() {
        let records = parse_table("2023-10-01 00:00:00,4,5,6");
        assert_eq!(values(&records), vec![(day(2023, 10, 1), 4, 5, 6)]);
    }

    #[test]
    fn test_export_then_import_keeps_values() {
        let original = parse_table("01/10/2023\t20\t10\t5\n03/10/2023\t0\t100\t\n02/10/2023\t25\t15\t60");
        let exported = export_csv(&original).unwrap();
        let reimported = parse_table(&exported);
        assert_eq!(values(&reimported), values(&original));
    }
}
