use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Subcommand;
use dayflow_core::{Execution, Task, TaskStatus};
use dayflow_ingest::{save_snapshot, Snapshot};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::Config;
use crate::state::load_input;

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Tasks with their status, flagging overdue and high-energy work
    List {
        /// Include done and cancelled tasks
        #[arg(long, default_value_t = false)]
        all: bool,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Mark a task done
    Done {
        id: String,

        /// Completion time, YYYY-MM-DDTHH:MM:SS (default: now in the configured timezone)
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },

    /// Push a task back; each postponement lowers its ranking
    Postpone { id: String },

    /// Record a work session on a task
    Log {
        id: String,

        /// YYYY-MM-DDTHH:MM:SS (default: now minus --minutes)
        #[arg(long)]
        started_at: Option<NaiveDateTime>,

        /// Actual minutes spent
        #[arg(long)]
        minutes: Option<u32>,

        /// Self-reported focus, 1-10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        focus: Option<u8>,

        /// Self-reported energy, 1-10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        energy: Option<u8>,
    },

    /// Accept the saved recommendation for a task (see: recommend --save)
    Accept { id: String },

    /// Reject the saved recommendation for a task
    Reject { id: String },
}

#[derive(Debug, Serialize)]
pub struct TaskLine {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub estimated_duration_minutes: u32,
    pub overdue: bool,
    pub high_energy: bool,
}

pub fn run(cfg: &Config, input: Option<PathBuf>, cmd: TaskCommand) -> Result<()> {
    let (path, mut snapshot) = load_input(input)?;

    match cmd {
        TaskCommand::List { all, json } => {
            let lines = listing(&snapshot, cfg.today()?, all);
            if json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                print_listing(&lines);
            }
            return Ok(());
        }

        TaskCommand::Done { id, at } => {
            let at = match at {
                Some(at) => at,
                None => cfg.now()?,
            };
            complete(&mut snapshot, &id, at)?;
            println!("Marked {id} done at {}", at.format("%Y-%m-%d %H:%M"));
        }

        TaskCommand::Postpone { id } => {
            let count = postpone(&mut snapshot, &id)?;
            println!("Postponed {id} ({count} time{})", if count == 1 { "" } else { "s" });
        }

        TaskCommand::Log {
            id,
            started_at,
            minutes,
            focus,
            energy,
        } => {
            let started_at = match started_at {
                Some(at) => at,
                None => cfg.now()? - chrono::Duration::minutes(i64::from(minutes.unwrap_or(0))),
            };
            let mut execution = Execution::new(&id, started_at);
            if let Some(m) = minutes {
                execution = execution.with_actual_minutes(m);
            }
            if let Some(f) = focus {
                execution = execution.with_focus(f);
            }
            if let Some(e) = energy {
                execution = execution.with_energy(e);
            }
            let ratio = log_session(&mut snapshot, execution)?;
            println!("Logged session on {id} at {}", started_at.format("%Y-%m-%d %H:%M"));
            if ratio > 0.0 {
                println!("Efficiency: {ratio:.2} (estimate / actual)");
            }
        }

        TaskCommand::Accept { id } => {
            set_verdict(&mut snapshot, &id, true)?;
            println!("Accepted recommendation for {id}");
        }

        TaskCommand::Reject { id } => {
            set_verdict(&mut snapshot, &id, false)?;
            println!("Rejected recommendation for {id}");
        }
    }

    save_snapshot(&path, &snapshot)?;
    Ok(())
}

fn find_task<'a>(snapshot: &'a mut Snapshot, id: &str) -> Result<&'a mut Task> {
    snapshot
        .task_mut(id)
        .with_context(|| format!("Unknown task id: {id}"))
}

pub fn listing(snapshot: &Snapshot, today: NaiveDate, all: bool) -> Vec<TaskLine> {
    snapshot
        .tasks
        .iter()
        .filter(|t| all || !matches!(t.status, TaskStatus::Done | TaskStatus::Cancelled))
        .map(|t| TaskLine {
            id: t.id.clone(),
            title: t.title.clone(),
            status: t.status,
            due_date: t.due_date,
            estimated_duration_minutes: t.estimated_duration_minutes,
            overdue: t.is_overdue(today),
            high_energy: t.requires_high_energy(),
        })
        .collect()
}

pub fn complete(snapshot: &mut Snapshot, id: &str, at: NaiveDateTime) -> Result<()> {
    let task = find_task(snapshot, id)?;
    if task.status == TaskStatus::Done {
        tracing::warn!(task = id, "task already done; updating completion time");
    }
    task.mark_done(at);
    Ok(())
}

/// Returns the new postpone count.
pub fn postpone(snapshot: &mut Snapshot, id: &str) -> Result<u32> {
    let task = find_task(snapshot, id)?;
    if task.status == TaskStatus::Done {
        bail!("Task {id} is already done");
    }
    task.postpone();
    Ok(task.postpone_count)
}

/// Store the session and return its efficiency against the task estimate.
pub fn log_session(snapshot: &mut Snapshot, execution: Execution) -> Result<f64> {
    let estimate = find_task(snapshot, &execution.task_id)?.estimated_duration_minutes;
    let ratio = execution.efficiency_ratio(estimate);
    tracing::debug!(task = %execution.task_id, ratio, "session logged");
    snapshot.upsert_execution(execution);
    Ok(ratio)
}

pub fn set_verdict(snapshot: &mut Snapshot, id: &str, accepted: bool) -> Result<()> {
    let Some(rec) = snapshot.recommendation_mut(id) else {
        bail!("No saved recommendation for {id}. Run: dayflow recommend --task {id} --save");
    };
    if accepted {
        rec.accept();
    } else {
        rec.reject();
    }
    Ok(())
}

fn print_listing(lines: &[TaskLine]) {
    if lines.is_empty() {
        println!("No tasks.");
        return;
    }
    for l in lines {
        let due = l.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
        let mut flags = Vec::new();
        if l.overdue {
            flags.push("overdue");
        }
        if l.high_energy {
            flags.push("high energy");
        }
        println!(
            "{:<12} {:<12} due {:<10} {:>4} min  {}{}",
            l.id,
            format!("{:?}", l.status),
            due,
            l.estimated_duration_minutes,
            l.title,
            if flags.is_empty() {
                String::new()
            } else {
                format!("  [{}]", flags.join(", "))
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dayflow_core::{CriteriaBreakdown, EnergyRequired, Recommendation};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            tasks: vec![
                Task::new("deck", "Board deck")
                    .with_energy(EnergyRequired::High)
                    .with_duration(60)
                    .with_due_date(day(2)),
                Task::new("mail", "Inbox").with_status(TaskStatus::Done),
                Task::new("gym", "Gym").with_due_date(day(9)),
            ],
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_listing_flags_overdue_and_high_energy() {
        let lines = listing(&snapshot(), day(3), false);
        let ids: Vec<_> = lines.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["deck", "gym"]);
        assert!(lines[0].overdue);
        assert!(lines[0].high_energy);
        assert!(!lines[1].overdue);
        assert!(!lines[1].high_energy);
        assert_eq!(listing(&snapshot(), day(3), true).len(), 3);
    }

    #[test]
    fn test_done_and_postpone_update_the_snapshot() {
        let mut s = snapshot();
        assert_eq!(postpone(&mut s, "gym").unwrap(), 1);
        assert_eq!(postpone(&mut s, "gym").unwrap(), 2);
        assert_eq!(s.task("gym").unwrap().status, TaskStatus::Postponed);

        complete(&mut s, "deck", at(2, 16)).unwrap();
        let deck = s.task("deck").unwrap();
        assert_eq!(deck.status, TaskStatus::Done);
        assert_eq!(deck.completed_at, Some(at(2, 16)));
        assert!(listing(&s, day(3), false).iter().all(|l| l.id != "deck"));

        assert!(postpone(&mut s, "deck").is_err());
        assert!(complete(&mut s, "nope", at(2, 9)).is_err());
    }

    #[test]
    fn test_log_session_reports_efficiency() {
        let mut s = snapshot();
        let e = Execution::new("deck", at(2, 9)).with_actual_minutes(90).with_focus(6);
        let ratio = log_session(&mut s, e).unwrap();
        assert!((ratio - 60.0 / 90.0).abs() < 1e-9);

        // Same task and start replaces the earlier entry.
        let e = Execution::new("deck", at(2, 9)).with_actual_minutes(60).with_focus(8);
        assert_eq!(log_session(&mut s, e).unwrap(), 1.0);
        assert_eq!(s.executions.len(), 1);
        assert_eq!(s.executions[0].focus_score, Some(8));

        assert_eq!(log_session(&mut s, Execution::new("gym", at(2, 18))).unwrap(), 0.0);
        assert!(log_session(&mut s, Execution::new("nope", at(2, 9))).is_err());
        assert_eq!(s.executions.len(), 2);
    }

    #[test]
    fn test_verdict_needs_saved_recommendation() {
        let mut s = snapshot();
        assert!(set_verdict(&mut s, "deck", true).is_err());

        s.save_recommendation(Recommendation {
            task_id: "deck".into(),
            start: at(2, 9),
            end: at(2, 10),
            confidence: 0.8,
            criteria: CriteriaBreakdown {
                energy_match: 1.0,
                priority_score: 0.5,
                postpone_penalty: 0.0,
                morning_bonus: 0.2,
                ml_boost: 0.0,
                total: 0.8,
            },
            explanation: String::new(),
            model_tag: "heuristic-v1".into(),
            accepted: None,
        });
        set_verdict(&mut s, "deck", false).unwrap();
        assert_eq!(s.recommendations[0].accepted, Some(false));
        set_verdict(&mut s, "deck", true).unwrap();
        assert_eq!(s.recommendations[0].accepted, Some(true));
    }
}
