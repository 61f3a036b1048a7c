//! Fixed-granularity candidate placements for a single task.

use crate::availability::TimeWindow;
use crate::time::plus_minutes;

/// Start times are tried every 15 minutes from each window's start.
pub const CANDIDATE_STEP_MINUTES: u32 = 15;

/// Number of candidates a window yields for `duration_minutes`: floor((L - D) / 15) + 1, or 0.
pub fn candidate_count(window: &TimeWindow, duration_minutes: u32) -> usize {
    let length = window.duration_minutes();
    let duration = i64::from(duration_minutes);
    if duration == 0 || duration > length {
        return 0;
    }
    ((length - duration) / i64::from(CANDIDATE_STEP_MINUTES) + 1) as usize
}

/// Every placement of `duration_minutes` that ends inside a window.
///
/// Windows are visited in the given order; candidates within a window are
/// time-ascending. A zero duration yields nothing.
pub fn generate_candidates(windows: &[TimeWindow], duration_minutes: u32) -> Vec<TimeWindow> {
    if duration_minutes == 0 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(
        windows
            .iter()
            .map(|w| candidate_count(w, duration_minutes))
            .sum(),
    );

    for window in windows {
        let mut cursor = window.start;
        loop {
            let end = plus_minutes(cursor, duration_minutes);
            if end > window.end {
                break;
            }
            out.push(TimeWindow { start: cursor, end });
            cursor = plus_minutes(cursor, CANDIDATE_STEP_MINUTES);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_count_matches_formula() {
        let w = TimeWindow::new(at(9, 0), at(17, 0)).unwrap();
        for duration in [15, 30, 45, 60, 90, 100, 480] {
            let expected = (480 - duration as usize) / 15 + 1;
            assert_eq!(candidate_count(&w, duration), expected);
            assert_eq!(generate_candidates(&[w], duration).len(), expected);
        }
        assert_eq!(candidate_count(&w, 481), 0);
        assert!(generate_candidates(&[w], 481).is_empty());
    }

    #[test]
    fn test_candidates_are_ordered_and_bounded() {
        let windows = [
            TimeWindow::new(at(9, 0), at(10, 0)).unwrap(),
            TimeWindow::new(at(14, 0), at(14, 50)).unwrap(),
        ];
        let c = generate_candidates(&windows, 40);
        let starts: Vec<_> = c.iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![at(9, 0), at(9, 15), at(14, 0)]);
        assert!(c.iter().all(|w| w.duration_minutes() == 40));
    }

    #[test]
    fn test_zero_duration_yields_nothing() {
        let w = TimeWindow::new(at(9, 0), at(10, 0)).unwrap();
        assert!(generate_candidates(&[w], 0).is_empty());
        assert_eq!(candidate_count(&w, 0), 0);
    }
}
