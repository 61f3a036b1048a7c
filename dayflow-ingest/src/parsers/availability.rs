//! Weekly availability CSV.
//!
//! Columns: `day,range,active`, e.g. `monday,09:00-12:30,true`. `active` may be
//! blank (treated as true).

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use dayflow_core::{Availability, DayOfWeek};
use regex::Regex;

use super::{field, parse_bool};

pub fn parse_availability_csv(path: impl AsRef<Path>) -> Result<Vec<Availability>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    read_availability(file)
}

pub fn read_availability(input: impl io::Read) -> Result<Vec<Availability>> {
    let range_re = Regex::new(r"^(?P<sh>\d{1,2}):(?P<sm>\d{2})\s*-\s*(?P<eh>\d{1,2}):(?P<em>\d{2})$")?;

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(input);

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result?;

        let day = match parse_day(field(&record, 0)) {
            Some(d) => d,
            None => continue,
        };

        let Some(caps) = range_re.captures(field(&record, 1)) else {
            continue;
        };
        let start = hm(&caps["sh"], &caps["sm"]);
        let end = hm(&caps["eh"], &caps["em"]);
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) if s < e => (s, e),
            _ => continue,
        };

        let active = match field(&record, 2) {
            "" => true,
            s => match parse_bool(s) {
                Some(b) => b,
                None => continue,
            },
        };

        let slot = Availability::new(day, start, end);
        out.push(if active { slot } else { slot.inactive() });
    }

    Ok(out)
}

fn hm(h: &str, m: &str) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}

/// Full English day name or its three-letter abbreviation, any case.
pub fn parse_day(s: &str) -> Option<DayOfWeek> {
    match s.to_ascii_lowercase().as_str() {
        "monday" | "mon" => Some(DayOfWeek::Monday),
        "tuesday" | "tue" => Some(DayOfWeek::Tuesday),
        "wednesday" | "wed" => Some(DayOfWeek::Wednesday),
        "thursday" | "thu" => Some(DayOfWeek::Thursday),
        "friday" | "fri" => Some(DayOfWeek::Friday),
        "saturday" | "sat" => Some(DayOfWeek::Saturday),
        "sunday" | "sun" => Some(DayOfWeek::Sunday),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_read_availability() {
        let csv = "\
day,range,active
monday,09:00-12:30,true
Tue,13:00 - 17:00,
wednesday,9:00-10:00,no
thursday,12:00-09:00,true
fri,25:00-26:00,true
someday,09:00-10:00,true
friday,0900-1000,true
saturday,10:00-11:00,perhaps
";
        let slots = read_availability(csv.as_bytes()).unwrap();
        assert_eq!(slots.len(), 3);

        assert_eq!(slots[0], Availability::new(DayOfWeek::Monday, t(9, 0), t(12, 30)));
        assert_eq!(slots[1].day_of_week, DayOfWeek::Tuesday);
        assert!(slots[1].is_active);
        assert_eq!(slots[2].start_time, t(9, 0));
        assert!(!slots[2].is_active);
    }

    #[test]
    fn test_parse_day_names() {
        assert_eq!(parse_day("Sunday"), Some(DayOfWeek::Sunday));
        assert_eq!(parse_day("thu"), Some(DayOfWeek::Thursday));
        assert_eq!(parse_day("thursdays"), None);
        assert_eq!(parse_day("mo"), None);
    }
}
