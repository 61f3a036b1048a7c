//! Classic planner: greedy, energy-aware placement of a whole backlog into a day.
//!
//! Tasks are ranked by composite score, then poured into the day's windows in
//! order. At each cursor position the first task whose energy requirement is
//! met by the period's level wins; when nothing matches, the top-ranked task is
//! placed anyway. A break is inserted after every `break_after_minutes` of work.
//!
//! Greedy: no makespan or fairness guarantees.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::availability::{build_day_windows, Availability, TimeWindow};
use crate::energy::EnergyProfile;
use crate::task::Task;
use crate::time::{minutes_between, plus_minutes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Work minutes accumulated before a break is due.
    pub break_after_minutes: u32,
    pub break_minutes: u32,
    /// Cursor advance when nothing can be placed.
    pub probe_step_minutes: u32,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            break_after_minutes: 90,
            break_minutes: 10,
            probe_step_minutes: 15,
        }
    }
}

/// One entry of a day plan: either a task or a break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub task_id: Option<String>,
    pub is_break: bool,
}

impl PlanningSlot {
    fn task(start: NaiveDateTime, end: NaiveDateTime, task: &Task) -> Self {
        Self {
            start,
            end,
            task_id: Some(task.id.clone()),
            is_break: false,
        }
    }

    fn pause(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            task_id: None,
            is_break: true,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        minutes_between(self.start, self.end)
    }

    pub fn overlaps(&self, other: &PlanningSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverloadReport {
    pub overloaded: bool,
    pub total_task_minutes: i64,
    pub total_available_minutes: i64,
    pub excess_minutes: i64,
}

/// Compare backlog size against active availability for whatever scope the caller passes.
///
/// Independent of whether placement would actually succeed.
pub fn detect_overload(tasks: &[Task], availabilities: &[Availability]) -> OverloadReport {
    let total_task_minutes: i64 = tasks
        .iter()
        .map(|t| i64::from(t.estimated_duration_minutes))
        .sum();
    let total_available_minutes: i64 = availabilities
        .iter()
        .filter(|a| a.is_active)
        .map(Availability::duration_minutes)
        .sum();

    OverloadReport {
        overloaded: total_task_minutes > total_available_minutes,
        total_task_minutes,
        total_available_minutes,
        excess_minutes: (total_task_minutes - total_available_minutes).max(0),
    }
}

/// Stable descending sort by composite score; ties keep input order.
pub fn rank_by_composite<'a>(tasks: &'a [Task], today: NaiveDate) -> Vec<&'a Task> {
    let mut ranked: Vec<(f64, &Task)> = tasks.iter().map(|t| (t.composite_score(today), t)).collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().map(|(_, t)| t).collect()
}

#[derive(Debug, Clone, Default)]
pub struct ClassicPlanningEngine {
    energy: EnergyProfile,
    config: PlanningConfig,
}

impl ClassicPlanningEngine {
    pub fn new(energy: EnergyProfile) -> Self {
        Self {
            energy,
            config: PlanningConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PlanningConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    /// Plan `target_date` from recurring availability (no fallback window).
    ///
    /// `today` anchors the due-date urgency buckets.
    pub fn generate_day_plan(
        &self,
        tasks: &[Task],
        availabilities: &[Availability],
        target_date: NaiveDate,
        today: NaiveDate,
    ) -> Vec<PlanningSlot> {
        let day = build_day_windows(availabilities, target_date, false);
        if day.is_empty() {
            tracing::debug!(%target_date, "no availability for date, empty plan");
            return Vec::new();
        }
        self.plan_windows(tasks, &day.windows, today)
    }

    /// Place `tasks` into `windows` (visited in the given order).
    pub fn plan_windows(&self, tasks: &[Task], windows: &[TimeWindow], today: NaiveDate) -> Vec<PlanningSlot> {
        let ranked = rank_by_composite(tasks, today);
        let plan = self.assign(&ranked, windows);

        let placed = plan.iter().filter(|s| !s.is_break).count();
        tracing::debug!(
            tasks = tasks.len(),
            placed,
            breaks = plan.len() - placed,
            windows = windows.len(),
            "day plan generated"
        );
        plan
    }

    fn assign(&self, ranked: &[&Task], windows: &[TimeWindow]) -> Vec<PlanningSlot> {
        let cfg = self.config;
        let probe = Duration::minutes(i64::from(cfg.probe_step_minutes.max(1)));

        let mut plan = Vec::new();
        // Arena of ranked tasks plus an exclusion marker; never shrink the slice.
        let mut remaining = vec![true; ranked.len()];
        let mut left = ranked.len();
        // Carries across windows: a break can open the next window.
        let mut work_since_break: u32 = 0;

        for window in windows {
            let mut cursor = window.start;

            while cursor < window.end && left > 0 {
                if work_since_break >= cfg.break_after_minutes {
                    let break_end = plus_minutes(cursor, cfg.break_minutes);
                    if break_end > window.end {
                        break;
                    }
                    plan.push(PlanningSlot::pause(cursor, break_end));
                    cursor = break_end;
                    work_since_break = 0;
                }

                let Some(mut pick) = self.pick_task(ranked, &remaining, cursor) else {
                    cursor += probe;
                    continue;
                };

                let mut end = plus_minutes(cursor, ranked[pick].estimated_duration_minutes);
                if end > window.end {
                    let room = minutes_between(cursor, window.end);
                    let shorter = (0..ranked.len()).find(|&i| {
                        remaining[i] && i != pick && i64::from(ranked[i].estimated_duration_minutes) <= room
                    });
                    match shorter {
                        Some(i) => {
                            pick = i;
                            end = plus_minutes(cursor, ranked[pick].estimated_duration_minutes);
                        }
                        None => break,
                    }
                }

                let task = ranked[pick];
                tracing::debug!(task = %task.id, start = %cursor, end = %end, "placed task");
                plan.push(PlanningSlot::task(cursor, end, task));
                remaining[pick] = false;
                left -= 1;
                work_since_break += task.estimated_duration_minutes;
                cursor = end;
            }
        }

        plan
    }

    /// First remaining task whose energy need is met at `at`, else the top-ranked remaining task.
    fn pick_task(&self, ranked: &[&Task], remaining: &[bool], at: NaiveDateTime) -> Option<usize> {
        let level = self.energy.level_at(at);
        let mut first_remaining = None;
        for (i, task) in ranked.iter().enumerate() {
            if !remaining[i] {
                continue;
            }
            if task.energy_required.is_met_by(level) {
                return Some(i);
            }
            if first_remaining.is_none() {
                first_remaining = Some(i);
            }
        }
        first_remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::DayOfWeek;
    use crate::energy::{EnergyPeriod, EnergyRequired};
    use crate::task::Priority;
    use chrono::NaiveTime;

    // 2026-03-02 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        monday().and_hms_opt(h, m, 0).unwrap()
    }

    fn window(sh: u32, eh: u32) -> TimeWindow {
        TimeWindow::new(at(sh, 0), at(eh, 0)).unwrap()
    }

    fn task(id: &str, minutes: u32) -> Task {
        Task::new(id, id).with_duration(minutes)
    }

    fn engine() -> ClassicPlanningEngine {
        ClassicPlanningEngine::new(EnergyProfile::default())
    }

    #[test]
    fn test_empty_windows_yield_empty_plan() {
        let plan = engine().plan_windows(&[task("a", 30)], &[], monday());
        assert!(plan.is_empty());

        let plan = engine().generate_day_plan(&[task("a", 30)], &[], monday(), monday());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_slots_stay_inside_window_without_overlap() {
        let tasks = vec![task("a", 50), task("b", 40), task("c", 30), task("d", 45)];
        let w = window(9, 12);
        let plan = engine().plan_windows(&tasks, &[w], monday());

        assert_eq!(plan.iter().filter(|s| !s.is_break).count(), 4);
        for (i, s) in plan.iter().enumerate() {
            assert!(s.start >= w.start && s.end <= w.end, "slot {s:?} escapes window");
            for other in &plan[i + 1..] {
                assert!(!s.overlaps(other), "{s:?} overlaps {other:?}");
            }
        }
    }

    #[test]
    fn test_break_after_ninety_minutes() {
        let tasks = vec![task("a", 60), task("b", 30), task("c", 30)];
        let plan = engine().plan_windows(&tasks, &[window(9, 12)], monday());

        assert_eq!(plan.len(), 4);
        assert!(plan[2].is_break);
        assert_eq!(plan[2].start, at(10, 30));
        assert_eq!(plan[2].end, at(10, 40));
        assert_eq!(plan[3].start, at(10, 40));
    }

    #[test]
    fn test_break_that_does_not_fit_closes_window() {
        // 90 minutes fill the window up to 10:35, only 5 minutes left.
        let tasks = vec![task("a", 90), task("b", 5)];
        let w = TimeWindow::new(at(9, 5), at(10, 40)).unwrap();
        let plan = engine().plan_windows(&tasks, &[w], monday());
        assert_eq!(plan.len(), 1);
        assert!(!plan[0].is_break);
    }

    #[test]
    fn test_composite_order_and_stable_ties() {
        let tasks = vec![
            task("low", 30).with_priority(Priority::Low),
            task("first-medium", 30),
            task("second-medium", 30),
            task("critical", 30).with_priority(Priority::Critical),
        ];
        let plan = engine().plan_windows(&tasks, &[window(9, 12)], monday());
        let ids: Vec<_> = plan.iter().filter_map(|s| s.task_id.as_deref()).collect();
        assert_eq!(ids, ["critical", "first-medium", "second-medium", "low"]);
    }

    #[test]
    fn test_energy_alignment_prefers_matching_task() {
        let energy = EnergyProfile::from_entries([(EnergyPeriod::Morning, 5)]);
        let tasks = vec![
            task("deep", 30)
                .with_priority(Priority::Critical)
                .with_energy(EnergyRequired::High),
            task("admin", 30).with_energy(EnergyRequired::Low),
        ];
        let plan = ClassicPlanningEngine::new(energy).plan_windows(&tasks, &[window(9, 10)], monday());
        assert_eq!(plan[0].task_id.as_deref(), Some("admin"));
        // Nothing left matches level 5, so the high-energy task is placed anyway.
        assert_eq!(plan[1].task_id.as_deref(), Some("deep"));
    }

    #[test]
    fn test_overflow_substitutes_shorter_task() {
        let tasks = vec![
            task("long", 90).with_priority(Priority::Critical),
            task("short", 20),
        ];
        let w = TimeWindow::new(at(9, 0), at(9, 30)).unwrap();
        let plan = engine().plan_windows(&tasks, &[w], monday());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].task_id.as_deref(), Some("short"));
    }

    #[test]
    fn test_unplaced_task_moves_to_next_window() {
        let tasks = vec![task("a", 60), task("b", 60)];
        let plan = engine().plan_windows(&tasks, &[window(9, 10), window(14, 15)], monday());
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].start, at(14, 0));
    }

    #[test]
    fn test_detect_overload_basic() {
        let avail = vec![Availability::new(
            DayOfWeek::Monday,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )];
        let report = detect_overload(&[task("a", 45), task("b", 45)], &avail);
        assert!(report.overloaded);
        assert_eq!(report.total_task_minutes, 90);
        assert_eq!(report.total_available_minutes, 60);
        assert_eq!(report.excess_minutes, 30);

        let fine = detect_overload(&[task("a", 60)], &avail);
        assert!(!fine.overloaded);
        assert_eq!(fine.excess_minutes, 0);
    }

    #[test]
    fn test_detect_overload_ignores_inactive() {
        let avail = vec![Availability::new(
            DayOfWeek::Monday,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        )
        .inactive()];
        let report = detect_overload(&[task("a", 15)], &avail);
        assert!(report.overloaded);
        assert_eq!(report.total_available_minutes, 0);
        assert_eq!(report.excess_minutes, 15);
    }
}
