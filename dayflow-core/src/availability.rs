//! Recurring weekly availability and the concrete windows derived from it.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::time::minutes_between;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    /// Monday = 0 .. Sunday = 6
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// A recurring slot where the user is available to work.
///
/// Entries may overlap each other; nothing here merges or rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Availability {
    pub fn new(day_of_week: DayOfWeek, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            day_of_week,
            start_time,
            end_time,
            is_active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    pub fn overlaps_with(&self, other: &Availability) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    /// Concrete window on `date`, or `None` if the entry is degenerate (start >= end).
    pub fn on(&self, date: NaiveDate) -> Option<TimeWindow> {
        TimeWindow::new(date.and_time(self.start_time), date.and_time(self.end_time))
    }
}

/// Half-open [start, end) span of a single day, produced fresh per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn duration_minutes(&self) -> i64 {
        minutes_between(self.start, self.end)
    }
}

/// Default window used when the user configured nothing for the day.
pub const FALLBACK_START: (u32, u32) = (9, 0);
pub const FALLBACK_END: (u32, u32) = (18, 0);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayWindows {
    pub windows: Vec<TimeWindow>,
    /// True when `windows` is the synthetic 09:00-18:00 default.
    pub used_fallback: bool,
}

impl DayWindows {
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn total_minutes(&self) -> i64 {
        self.windows.iter().map(TimeWindow::duration_minutes).sum()
    }
}

/// Turn active availability entries matching `date`'s weekday into sorted windows.
///
/// With `fallback` set, a day without entries yields a single 09:00-18:00 window.
pub fn build_day_windows(availabilities: &[Availability], date: NaiveDate, fallback: bool) -> DayWindows {
    let day = DayOfWeek::of(date);
    let mut windows: Vec<TimeWindow> = availabilities
        .iter()
        .filter(|a| a.is_active && a.day_of_week == day)
        .filter_map(|a| a.on(date))
        .collect();
    windows.sort_by_key(|w| w.start);

    if windows.is_empty() && fallback {
        let start = NaiveTime::from_hms_opt(FALLBACK_START.0, FALLBACK_START.1, 0);
        let end = NaiveTime::from_hms_opt(FALLBACK_END.0, FALLBACK_END.1, 0);
        if let Some(w) = start
            .zip(end)
            .and_then(|(s, e)| TimeWindow::new(date.and_time(s), date.and_time(e)))
        {
            tracing::debug!(%date, "no availability configured, using default window");
            return DayWindows {
                windows: vec![w],
                used_fallback: true,
            };
        }
    }

    DayWindows {
        windows,
        used_fallback: false,
    }
}
