//! Task backlog CSV.
//!
//! Columns: `id,title,priority,energy,duration,due,status,postpone_count`.
//! Only `id` and `title` are required; blank cells take the task defaults.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use dayflow_core::{EnergyRequired, Priority, Task, TaskStatus};

use super::{field, parse_date};

pub fn parse_tasks_csv(path: impl AsRef<Path>) -> Result<Vec<Task>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    read_tasks(file)
}

pub fn read_tasks(input: impl io::Read) -> Result<Vec<Task>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(input);

    let mut tasks = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if let Some(task) = task_from_record(&record) {
            tasks.push(task);
        }
    }
    Ok(tasks)
}

fn task_from_record(record: &csv::StringRecord) -> Option<Task> {
    let id = field(record, 0);
    let title = field(record, 1);
    if id.is_empty() || title.is_empty() {
        return None;
    }

    let mut task = Task::new(id, title);

    let priority = field(record, 2);
    if !priority.is_empty() {
        task.priority = parse_priority(priority)?;
    }

    let energy = field(record, 3);
    if !energy.is_empty() {
        task.energy_required = parse_energy(energy)?;
    }

    let duration = field(record, 4);
    if !duration.is_empty() {
        task.estimated_duration_minutes = duration.parse().ok().filter(|&m: &u32| m > 0)?;
    }

    let due = field(record, 5);
    if !due.is_empty() {
        task.due_date = Some(parse_date(due)?);
    }

    let status = field(record, 6);
    if !status.is_empty() {
        task.status = parse_status(status)?;
    }

    let postponed = field(record, 7);
    if !postponed.is_empty() {
        task.postpone_count = postponed.parse().ok()?;
    }

    Some(task)
}

pub fn parse_priority(s: &str) -> Option<Priority> {
    match s.to_ascii_lowercase().as_str() {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        "critical" => Some(Priority::Critical),
        _ => None,
    }
}

pub fn parse_energy(s: &str) -> Option<EnergyRequired> {
    match s.to_ascii_lowercase().as_str() {
        "low" => Some(EnergyRequired::Low),
        "medium" => Some(EnergyRequired::Medium),
        "high" => Some(EnergyRequired::High),
        _ => None,
    }
}

pub fn parse_status(s: &str) -> Option<TaskStatus> {
    match s.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
        "pending" => Some(TaskStatus::Pending),
        "scheduled" => Some(TaskStatus::Scheduled),
        "in_progress" => Some(TaskStatus::InProgress),
        "done" => Some(TaskStatus::Done),
        "postponed" => Some(TaskStatus::Postponed),
        "cancelled" | "canceled" => Some(TaskStatus::Cancelled),
        _ => None,
    }
}
