//! JSON snapshot of everything the engine consumes for one user.

use std::path::Path;

use anyhow::{Context, Result};
use dayflow_core::{
    Availability, EnergyPeriod, EnergyProfile, Execution, Recommendation, ScoreBook,
    ScoreRecord, Task,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyEntry {
    pub period: EnergyPeriod,
    /// 1-10
    pub level: u8,
}

/// `{ tasks, availabilities, energy, executions, scores, recommendations }`,
/// every list optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub availabilities: Vec<Availability>,
    pub energy: Vec<EnergyEntry>,
    pub executions: Vec<Execution>,
    pub scores: Vec<ScoreRecord>,
    /// Latest saved recommendation per task.
    pub recommendations: Vec<Recommendation>,
}

impl Snapshot {
    /// Later entries for the same period win; levels are clamped to 1..=10.
    pub fn energy_profile(&self) -> EnergyProfile {
        EnergyProfile::from_entries(self.energy.iter().map(|e| (e.period, e.level.clamp(1, 10))))
    }

    /// Replace the stored level for `period`, keeping one entry per period.
    pub fn set_energy(&mut self, period: EnergyPeriod, level: u8) {
        self.energy.retain(|e| e.period != period);
        self.energy.push(EnergyEntry { period, level });
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn score_book(&self) -> ScoreBook {
        ScoreBook::from_records(self.scores.iter().cloned())
    }

    /// Write back a score book, one record per (date, type).
    pub fn set_scores(&mut self, book: ScoreBook) {
        self.scores = book.into_records();
    }

    /// Record a session, replacing one already logged for the same task and start.
    pub fn upsert_execution(&mut self, execution: Execution) {
        match self
            .executions
            .iter_mut()
            .find(|e| e.task_id == execution.task_id && e.started_at == execution.started_at)
        {
            Some(existing) => *existing = execution,
            None => self.executions.push(execution),
        }
    }

    /// Add a weekly slot; an identical slot only has its `is_active` flag updated.
    pub fn upsert_availability(&mut self, slot: Availability) {
        match self.availabilities.iter_mut().find(|a| {
            a.day_of_week == slot.day_of_week
                && a.start_time == slot.start_time
                && a.end_time == slot.end_time
        }) {
            Some(existing) => existing.is_active = slot.is_active,
            None => self.availabilities.push(slot),
        }
    }

    pub fn recommendation_mut(&mut self, task_id: &str) -> Option<&mut Recommendation> {
        self.recommendations.iter_mut().find(|r| r.task_id == task_id)
    }

    /// Keep `rec` as the saved recommendation for its task.
    pub fn save_recommendation(&mut self, rec: Recommendation) {
        match self.recommendation_mut(&rec.task_id) {
            Some(existing) => *existing = rec,
            None => self.recommendations.push(rec),
        }
    }

    /// Fold imported records in. Re-importing the same data leaves the snapshot unchanged.
    pub fn merge(&mut self, other: Snapshot) {
        for task in other.tasks {
            match self.task_mut(&task.id) {
                Some(existing) => *existing = task,
                None => self.tasks.push(task),
            }
        }
        for slot in other.availabilities {
            self.upsert_availability(slot);
        }
        for e in other.energy {
            self.set_energy(e.period, e.level);
        }
        for execution in other.executions {
            self.upsert_execution(execution);
        }
        let mut book = self.score_book();
        for r in other.scores {
            book.upsert(r);
        }
        self.set_scores(book);
        for rec in other.recommendations {
            self.save_recommendation(rec);
        }
    }
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot: Snapshot =
        serde_json::from_str(&raw).with_context(|| format!("parsing snapshot {}", path.display()))?;
    Ok(snapshot)
}

pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
