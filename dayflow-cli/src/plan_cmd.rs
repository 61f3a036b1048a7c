use anyhow::{bail, Result};
use chrono::NaiveDate;
use dayflow_core::{
    build_day_windows, detect_overload, Availability, ClassicPlanningEngine, DayOfWeek, DayWindows,
    EnergyProfile, FileModelStore, FocusPredictor, LearnedAdjustment, OverloadReport,
    PlanningSlot, Recommendation, SmartRecommender, Task, TaskStatus, TimeWindow,
};
use dayflow_ingest::{save_snapshot, Snapshot};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::Config;
use crate::state::load_input;

#[derive(Debug, Serialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub used_fallback: bool,
    pub slots: Vec<PlanningSlot>,
    pub overload: OverloadReport,
    /// Open tasks that did not make it into the plan.
    pub unplaced: Vec<String>,
}

/// Pending and postponed tasks. Scheduled or in-progress work is already placed.
pub fn open_tasks(snapshot: &Snapshot) -> Vec<Task> {
    snapshot
        .tasks
        .iter()
        .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::Postponed))
        .cloned()
        .collect()
}

pub fn day_windows(cfg: &Config, snapshot: &Snapshot, date: NaiveDate) -> DayWindows {
    build_day_windows(&snapshot.availabilities, date, cfg.general.fallback_window)
}

/// Capacity entries for the one weekday being planned; the fallback window counts when used.
fn day_capacity(snapshot: &Snapshot, day: &DayWindows, date: NaiveDate) -> Vec<Availability> {
    let weekday = DayOfWeek::of(date);
    if day.used_fallback {
        return day
            .windows
            .iter()
            .map(|w| Availability::new(weekday, w.start.time(), w.end.time()))
            .collect();
    }
    snapshot
        .availabilities
        .iter()
        .filter(|a| a.day_of_week == weekday)
        .cloned()
        .collect()
}

pub fn build_plan(cfg: &Config, snapshot: &Snapshot, date: NaiveDate, today: NaiveDate) -> DayPlan {
    let tasks = open_tasks(snapshot);
    let day = day_windows(cfg, snapshot, date);

    let engine = ClassicPlanningEngine::new(snapshot.energy_profile()).with_config(cfg.planning);
    let slots = engine.plan_windows(&tasks, &day.windows, today);
    let overload = detect_overload(&tasks, &day_capacity(snapshot, &day, date));

    let unplaced = tasks
        .iter()
        .filter(|t| !slots.iter().any(|s| s.task_id.as_deref() == Some(t.id.as_str())))
        .map(|t| t.id.clone())
        .collect();

    DayPlan {
        date,
        used_fallback: day.used_fallback,
        slots,
        overload,
        unplaced,
    }
}

pub fn run_plan(cfg: &Config, input: Option<PathBuf>, date: NaiveDate, today: NaiveDate, json: bool) -> Result<()> {
    let (_, snapshot) = load_input(input)?;
    let plan = build_plan(cfg, &snapshot, date, today);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("# Plan for {}\n", plan.date);
    if plan.used_fallback {
        println!("(no availability configured for this day; using the default window)\n");
    }
    if plan.slots.is_empty() {
        println!("Nothing scheduled.");
    }
    for slot in &plan.slots {
        let span = format!("{}-{}", slot.start.format("%H:%M"), slot.end.format("%H:%M"));
        match &slot.task_id {
            Some(id) => {
                let title = snapshot.task(id).map(|t| t.title.as_str()).unwrap_or("");
                println!("{span}  {id}  {title}");
            }
            None => println!("{span}  (break)"),
        }
    }

    if !plan.unplaced.is_empty() {
        println!("\nNot placed: {}", plan.unplaced.join(", "));
    }
    let o = &plan.overload;
    if o.overloaded {
        println!(
            "\nOverloaded: {} min of tasks vs {} min available ({} min over)",
            o.total_task_minutes, o.total_available_minutes, o.excess_minutes
        );
    }
    Ok(())
}

fn recommend_with<P: FocusPredictor>(
    energy: EnergyProfile,
    predictor: P,
    task: &Task,
    windows: &[TimeWindow],
) -> Option<Recommendation> {
    SmartRecommender::new(energy, predictor).recommend_slot(task, windows)
}

pub fn recommend(cfg: &Config, snapshot: &Snapshot, task_id: &str, date: NaiveDate) -> Result<Option<Recommendation>> {
    let Some(task) = snapshot.task(task_id) else {
        bail!("Unknown task id: {task_id}");
    };
    if task.status == TaskStatus::Done {
        tracing::warn!(task = task_id, "recommending a slot for a task already marked done");
    }

    let windows = day_windows(cfg, snapshot, date).windows;
    let energy = snapshot.energy_profile();

    let rec = if cfg.model.enabled {
        let learned = LearnedAdjustment::open(FileModelStore::new(cfg.model_path()?));
        recommend_with(energy, learned, task, &windows)
    } else {
        recommend_with(energy, LearnedAdjustment::disabled(), task, &windows)
    };
    Ok(rec)
}

pub fn run_recommend(
    cfg: &Config,
    input: Option<PathBuf>,
    task_id: &str,
    date: NaiveDate,
    json: bool,
    save: bool,
) -> Result<()> {
    let (path, mut snapshot) = load_input(input)?;
    let rec = recommend(cfg, &snapshot, task_id, date)?;

    if let Some(r) = rec.as_ref().filter(|_| save) {
        snapshot.save_recommendation(r.clone());
        save_snapshot(&path, &snapshot)?;
        tracing::info!(task = task_id, "recommendation saved");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rec)?);
        return Ok(());
    }

    match rec {
        Some(r) => {
            println!(
                "{} {}-{}  (confidence {:.2}, model {})\n",
                date,
                r.start.format("%H:%M"),
                r.end.format("%H:%M"),
                r.confidence,
                r.model_tag
            );
            println!("{}", r.explanation);
        }
        None => println!("No slot on {date} fits task {task_id}."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Timelike};
    use dayflow_core::{EnergyPeriod, EnergyRequired, Priority, HEURISTIC_TAG};

    // 2026-03-02 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn heuristic_config() -> Config {
        let mut cfg = Config::default();
        cfg.model.enabled = false;
        cfg
    }

    fn snapshot() -> Snapshot {
        let mut s = Snapshot {
            tasks: vec![
                Task::new("deep", "Deep work")
                    .with_priority(Priority::Critical)
                    .with_energy(EnergyRequired::High)
                    .with_duration(60),
                Task::new("done", "Already done").with_status(TaskStatus::Done),
                Task::new("huge", "Too big").with_duration(600),
            ],
            availabilities: vec![Availability::new(DayOfWeek::Monday, t(9), t(12))],
            ..Snapshot::default()
        };
        s.set_energy(EnergyPeriod::Morning, 9);
        s
    }

    #[test]
    fn test_plan_skips_done_and_reports_unplaced() {
        let plan = build_plan(&heuristic_config(), &snapshot(), monday(), monday());
        assert!(!plan.used_fallback);
        let ids: Vec<_> = plan.slots.iter().filter_map(|s| s.task_id.as_deref()).collect();
        assert_eq!(ids, ["deep"]);
        assert_eq!(plan.unplaced, vec!["huge".to_string()]);
        assert!(plan.overload.overloaded);
        assert_eq!(plan.overload.total_available_minutes, 180);
    }

    #[test]
    fn test_open_tasks_are_pending_or_postponed() {
        let mut s = snapshot();
        s.tasks.push(Task::new("later", "Later").with_status(TaskStatus::Postponed));
        s.tasks.push(Task::new("busy", "Busy").with_status(TaskStatus::InProgress));
        s.tasks.push(Task::new("booked", "Booked").with_status(TaskStatus::Scheduled));
        s.tasks.push(Task::new("dropped", "Dropped").with_status(TaskStatus::Cancelled));
        let ids: Vec<_> = open_tasks(&s).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["deep", "huge", "later"]);
    }

    #[test]
    fn test_plan_uses_fallback_capacity() {
        // 2026-03-03 is a Tuesday with nothing configured.
        let tuesday = monday().succ_opt().unwrap();
        let plan = build_plan(&heuristic_config(), &snapshot(), tuesday, tuesday);
        assert!(plan.used_fallback);
        assert_eq!(plan.overload.total_available_minutes, 540);

        let mut strict = heuristic_config();
        strict.general.fallback_window = false;
        let plan = build_plan(&strict, &snapshot(), tuesday, tuesday);
        assert!(plan.slots.is_empty());
        assert_eq!(plan.unplaced.len(), 2);
    }

    #[test]
    fn test_recommend_heuristic() {
        let rec = recommend(&heuristic_config(), &snapshot(), "deep", monday())
            .unwrap()
            .unwrap();
        assert_eq!(rec.model_tag, HEURISTIC_TAG);
        assert!(rec.start.hour() < 12);
        assert!(rec.explanation.contains("Deep work"));
    }

    #[test]
    fn test_recommend_without_fit_or_task() {
        assert!(recommend(&heuristic_config(), &snapshot(), "huge", monday())
            .unwrap()
            .is_none());
        assert!(recommend(&heuristic_config(), &snapshot(), "missing", monday()).is_err());
    }
}
