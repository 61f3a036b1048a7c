//! Small time and rounding helpers shared by the engine modules.

use chrono::{Duration, NaiveDateTime};

/// Whole minutes from `start` to `end` (negative if `end` precedes `start`).
pub fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_minutes()
}

pub fn plus_minutes(at: NaiveDateTime, minutes: u32) -> NaiveDateTime {
    at + Duration::minutes(i64::from(minutes))
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
