//! Task model consumed by the planner, the recommender and the score calculator.
//!
//! Tasks are owned by the caller; the engine only reads them. The two explicit
//! transitions (`mark_done`, `postpone`) exist so the record-mapping layer can
//! apply user actions before handing tasks back to the engine.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::energy::EnergyRequired;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Scheduled,
    InProgress,
    Done,
    Postponed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Multiplier used by the composite ranking score.
    pub fn weight(self) -> f64 {
        match self {
            Priority::Low => 1.0,
            Priority::Medium => 2.0,
            Priority::High => 3.5,
            Priority::Critical => 5.0,
        }
    }

    /// Priority mapped onto 0..1 for slot scoring.
    pub fn normalized(self) -> f64 {
        match self {
            Priority::Low => 0.2,
            Priority::Medium => 0.5,
            Priority::High => 0.8,
            Priority::Critical => 1.0,
        }
    }

    /// 1-based ordinal used as a model feature.
    pub fn ordinal(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Critical => 4,
        }
    }
}

/// Each postponement removes 15% of a task's effective score, floored at zero.
pub fn postpone_penalty(postpone_count: u32) -> f64 {
    (1.0 - postpone_count as f64 * 0.15).max(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,

    pub priority: Priority,
    pub energy_required: EnergyRequired,
    pub status: TaskStatus,

    /// Minutes, expected > 0.
    pub estimated_duration_minutes: u32,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    /// Never decreases.
    #[serde(default)]
    pub postpone_count: u32,

    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            priority: Priority::Medium,
            energy_required: EnergyRequired::Medium,
            status: TaskStatus::Pending,
            estimated_duration_minutes: 30,
            due_date: None,
            postpone_count: 0,
            completed_at: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_energy(mut self, energy: EnergyRequired) -> Self {
        self.energy_required = energy;
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration_minutes = minutes;
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_postpones(mut self, count: u32) -> Self {
        self.postpone_count = count;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn mark_done(&mut self, at: NaiveDateTime) {
        self.status = TaskStatus::Done;
        self.completed_at = Some(at);
    }

    pub fn postpone(&mut self) {
        self.status = TaskStatus::Postponed;
        self.postpone_count += 1;
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => today > due && self.status != TaskStatus::Done,
            None => false,
        }
    }

    pub fn requires_high_energy(&self) -> bool {
        self.energy_required == EnergyRequired::High
    }

    pub fn postpone_penalty(&self) -> f64 {
        postpone_penalty(self.postpone_count)
    }

    /// Urgency grows as the due date approaches; undated tasks rank below any dated one.
    pub fn urgency_score(&self, today: NaiveDate) -> f64 {
        let Some(due) = self.due_date else {
            return 0.5;
        };
        let days_left = (due - today).num_days();
        match days_left {
            d if d <= 0 => 2.0,
            1 => 1.8,
            2..=3 => 1.4,
            4..=7 => 1.1,
            _ => 1.0,
        }
    }

    /// Ranking score used by the classic planner (higher goes first).
    pub fn composite_score(&self, today: NaiveDate) -> f64 {
        self.priority.weight() * self.urgency_score(today) * self.postpone_penalty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_urgency_buckets() {
        let today = day(10);
        let t = |due: u32| Task::new("t", "t").with_due_date(day(due)).urgency_score(today);
        assert_eq!(t(9), 2.0);
        assert_eq!(t(10), 2.0);
        assert_eq!(t(11), 1.8);
        assert_eq!(t(13), 1.4);
        assert_eq!(t(17), 1.1);
        assert_eq!(t(18), 1.0);
        assert_eq!(Task::new("t", "t").urgency_score(today), 0.5);
    }

    #[test]
    fn test_composite_score_non_increasing_with_postpones() {
        let today = day(10);
        let mut prev = f64::INFINITY;
        for n in 0..10 {
            let score = Task::new("t", "t")
                .with_priority(Priority::High)
                .with_due_date(day(12))
                .with_postpones(n)
                .composite_score(today);
            assert!(score <= prev, "postpones={n} raised score {score} > {prev}");
            assert!(score >= 0.0);
            prev = score;
        }
        assert_eq!(prev, 0.0);
    }

    #[test]
    fn test_composite_score_ordering() {
        let today = day(10);
        let critical_today = Task::new("a", "a")
            .with_priority(Priority::Critical)
            .with_due_date(today);
        let low_undated = Task::new("b", "b").with_priority(Priority::Low);
        assert_eq!(critical_today.composite_score(today), 10.0);
        assert_eq!(low_undated.composite_score(today), 0.5);
    }

    #[test]
    fn test_transitions() {
        let mut t = Task::new("t", "write report").with_due_date(day(5));
        assert!(t.is_overdue(day(6)));

        t.postpone();
        t.postpone();
        assert_eq!(t.status, TaskStatus::Postponed);
        assert_eq!(t.postpone_count, 2);
        assert!((t.postpone_penalty() - 0.7).abs() < 1e-9);

        let at = day(6).and_hms_opt(14, 0, 0).unwrap();
        t.mark_done(at);
        assert_eq!(t.status, TaskStatus::Done);
        assert_eq!(t.completed_at, Some(at));
        assert!(!t.is_overdue(day(6)));
    }

    #[test]
    fn test_requires_high_energy() {
        assert!(Task::new("t", "t").with_energy(EnergyRequired::High).requires_high_energy());
        assert!(!Task::new("t", "t").with_energy(EnergyRequired::Medium).requires_high_energy());
        assert!(!Task::new("t", "t").requires_high_energy());
    }

    #[test]
    fn test_status_serde_names() {
        let s = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(s, "\"in_progress\"");
        let p: Priority = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(p, Priority::Critical);
    }
}
