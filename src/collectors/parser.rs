use crate::collectors::sheet::RawRow;
use crate::config::MeridiemPolicy;
use crate::error::ParseError;
use crate::models::{Metric, Reading, ReadingHistory};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

pub const DATE_COLUMN: &str = "Date";
pub const TIME_COLUMN: &str = "Time";

const FORMAT_24H: &str = "%m/%d/%Y %H:%M:%S";
const FORMAT_12H: &str = "%m/%d/%Y %I:%M:%S %p";

fn meridiem_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(.*?)\s*([AP]M)$").expect("valid meridiem pattern"))
}

/// Turn sheet rows into readings. Order is kept as returned by the store.
///
/// A malformed timestamp fails the whole batch; empty or non-numeric metric
/// cells become `None`.
pub fn parse_rows(rows: &[RawRow], policy: MeridiemPolicy) -> Result<ReadingHistory, ParseError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| parse_row(i + 1, row, policy))
        .collect::<Result<Vec<_>, _>>()
        .map(ReadingHistory::new)
}

fn parse_row(row_number: usize, row: &RawRow, policy: MeridiemPolicy) -> Result<Reading, ParseError> {
    let date = field(row, row_number, DATE_COLUMN)?;
    let time = field(row, row_number, TIME_COLUMN)?;

    Ok(Reading {
        timestamp: parse_timestamp(row_number, date, time, policy)?,
        temperature: parse_number(row.get(Metric::Temperature.name())),
        humidity: parse_number(row.get(Metric::Humidity.name())),
    })
}

fn field<'a>(row: &'a RawRow, row_number: usize, column: &'static str) -> Result<&'a str, ParseError> {
    row.get(column)
        .map(String::as_str)
        .ok_or(ParseError::MissingColumn {
            row: row_number,
            column,
        })
}

pub fn parse_timestamp(
    row_number: usize,
    date: &str,
    time: &str,
    policy: MeridiemPolicy,
) -> Result<NaiveDateTime, ParseError> {
    let time = time.trim();
    let date = date.trim();

    let (text, format) = match policy {
        MeridiemPolicy::Strip => {
            let stripped = time.replace(" AM", "").replace(" PM", "");
            (format!("{date} {stripped}"), FORMAT_24H)
        }
        MeridiemPolicy::Convert => match meridiem_regex().captures(time) {
            Some(caps) => (
                format!("{date} {} {}", &caps[1], caps[2].to_uppercase()),
                FORMAT_12H,
            ),
            None => (format!("{date} {time}"), FORMAT_24H),
        },
    };

    NaiveDateTime::parse_from_str(&text, format).map_err(|source| ParseError::Timestamp {
        row: row_number,
        text,
        source,
    })
}

fn parse_number(cell: Option<&String>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
