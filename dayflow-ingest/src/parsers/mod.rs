//! CSV exports → core entities.
//!
//! Every parser expects a header row and reads columns by position. Rows that
//! fail to parse are skipped rather than failing the import.

pub mod availability;
pub mod executions;
pub mod tasks;

pub use availability::parse_availability_csv;
pub use executions::parse_executions_csv;
pub use tasks::parse_tasks_csv;

use chrono::{NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn field<'a>(record: &'a csv::StringRecord, i: usize) -> &'a str {
    record.get(i).unwrap_or("").trim()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Self-reported 1-10 scale; anything else reads as unrecorded.
fn parse_rating(s: &str) -> Option<u8> {
    s.parse::<u8>().ok().filter(|v| (1..=10).contains(v))
}
