//! Productivity and burnout scoring over task outcomes and execution telemetry.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::execution::Execution;
use crate::task::{Task, TaskStatus};
use crate::time::round_to;

const DEFAULT_FOCUS: f64 = 5.0;
const DEFAULT_ENERGY: f64 = 5.0;
const TREND_WINDOW_DAYS: usize = 14;
const TREND_RECENT_DAYS: usize = 5;
const TREND_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BurnoutLabel {
    Low,
    Medium,
    High,
}

impl BurnoutLabel {
    pub fn from_risk(risk: f64) -> Self {
        if risk >= 0.75 {
            BurnoutLabel::High
        } else if risk >= 0.45 {
            BurnoutLabel::Medium
        } else {
            BurnoutLabel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BurnoutLabel::Low => "LOW",
            BurnoutLabel::Medium => "MEDIUM",
            BurnoutLabel::High => "HIGH",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            BurnoutLabel::High => "High burnout risk. Cut your workload now.",
            BurnoutLabel::Medium => "Watch out. Take regular breaks and limit critical tasks.",
            BurnoutLabel::Low => "You are on a good trajectory. Keep it up!",
        }
    }
}

impl fmt::Display for BurnoutLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded metrics for one (date, type). Always replaced whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub date: NaiveDate,
    pub score_type: ScoreType,
    /// 0..100
    pub total_score: f64,
    /// 0..10
    pub discipline_score: f64,
    /// 0..10
    pub focus_score: f64,
    pub energy_alignment_rate: f64,
    pub completion_rate: f64,
    pub burnout_risk_index: f64,
    pub tasks_completed: u32,
    pub tasks_postponed: u32,
    pub tasks_total: u32,
}

impl ScoreRecord {
    pub fn zero(date: NaiveDate, score_type: ScoreType) -> Self {
        Self {
            date,
            score_type,
            total_score: 0.0,
            discipline_score: 0.0,
            focus_score: 0.0,
            energy_alignment_rate: 0.0,
            completion_rate: 0.0,
            burnout_risk_index: 0.0,
            tasks_completed: 0,
            tasks_postponed: 0,
            tasks_total: 0,
        }
    }

    pub fn burnout_label(&self) -> BurnoutLabel {
        BurnoutLabel::from_risk(self.burnout_risk_index)
    }
}

/// Weighted fatigue estimate in [0, 1].
pub fn burnout_risk(completion_rate: f64, postponed_ratio: f64, avg_energy: f64) -> f64 {
    let low_energy = ((5.0 - avg_energy) / 5.0).max(0.0);
    (postponed_ratio * 0.4 + low_energy * 0.4 + (1.0 - completion_rate) * 0.2).clamp(0.0, 1.0)
}

/// Inputs relevant to one score date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayInputs {
    pub tasks: Vec<Task>,
    pub executions: Vec<Execution>,
}

/// Tasks due or completed on `date`, and executions started on it.
pub fn select_day_inputs(tasks: &[Task], executions: &[Execution], date: NaiveDate) -> DayInputs {
    DayInputs {
        tasks: tasks
            .iter()
            .filter(|t| t.due_date == Some(date) || t.completed_at.map(|c| c.date()) == Some(date))
            .cloned()
            .collect(),
        executions: executions
            .iter()
            .filter(|e| e.started_at.date() == date)
            .cloned()
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    #[serde(flatten)]
    pub record: ScoreRecord,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub burnout_label: BurnoutLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnoutPrediction {
    pub predicted_risk: f64,
    pub risk_level: BurnoutLabel,
    pub trend: Trend,
    /// Recent mean minus window mean.
    pub trend_delta: f64,
    pub based_on_days: usize,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BurnoutForecast {
    InsufficientData,
    Predicted(BurnoutPrediction),
}

pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Score one day. No tasks means an all-zero record.
    pub fn compute_daily_score(tasks: &[Task], executions: &[Execution], date: NaiveDate) -> ScoreRecord {
        if tasks.is_empty() {
            return ScoreRecord::zero(date, ScoreType::Daily);
        }

        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
        let postponed = tasks.iter().filter(|t| t.status == TaskStatus::Postponed).count();

        let completion_rate = completed as f64 / total as f64;
        let postponed_ratio = postponed as f64 / total as f64;
        let discipline_score = (1.0 - postponed_ratio * 1.5).max(0.0) * 10.0;

        let focus_score = mean(executions.iter().filter_map(Execution::recorded_focus)).unwrap_or(DEFAULT_FOCUS);
        let avg_energy = mean(executions.iter().filter_map(Execution::recorded_energy)).unwrap_or(DEFAULT_ENERGY);
        let energy_alignment_rate = (avg_energy / 10.0).min(1.0);

        let burnout = burnout_risk(completion_rate, postponed_ratio, avg_energy);

        let total_score = completion_rate * 40.0
            + (discipline_score / 10.0) * 25.0
            + (focus_score / 10.0) * 20.0
            + energy_alignment_rate * 15.0;

        ScoreRecord {
            date,
            score_type: ScoreType::Daily,
            total_score: round_to(total_score, 2),
            discipline_score: round_to(discipline_score, 2),
            focus_score: round_to(focus_score, 2),
            energy_alignment_rate: round_to(energy_alignment_rate, 2),
            completion_rate: round_to(completion_rate, 2),
            burnout_risk_index: round_to(burnout, 2),
            tasks_completed: completed as u32,
            tasks_postponed: postponed as u32,
            tasks_total: total as u32,
        }
    }

    /// Mean of every ratio/score metric, counts summed. Empty input gives a zero record.
    pub fn compute_weekly_score(daily: &[ScoreRecord], week_start: NaiveDate) -> ScoreRecord {
        if daily.is_empty() {
            return ScoreRecord::zero(week_start, ScoreType::Weekly);
        }
        let n = daily.len() as f64;
        let avg = |f: fn(&ScoreRecord) -> f64| round_to(daily.iter().map(f).sum::<f64>() / n, 2);

        ScoreRecord {
            date: week_start,
            score_type: ScoreType::Weekly,
            total_score: avg(|d| d.total_score),
            discipline_score: avg(|d| d.discipline_score),
            focus_score: avg(|d| d.focus_score),
            energy_alignment_rate: avg(|d| d.energy_alignment_rate),
            completion_rate: avg(|d| d.completion_rate),
            burnout_risk_index: avg(|d| d.burnout_risk_index),
            tasks_completed: daily.iter().map(|d| d.tasks_completed).sum(),
            tasks_postponed: daily.iter().map(|d| d.tasks_postponed).sum(),
            tasks_total: daily.iter().map(|d| d.tasks_total).sum(),
        }
    }

    pub fn weekly_summary(daily: &[ScoreRecord], week_start: NaiveDate) -> WeeklySummary {
        let record = Self::compute_weekly_score(daily, week_start);
        WeeklySummary {
            burnout_label: record.burnout_label(),
            week_start,
            week_end: week_start + Duration::days(6),
            record,
        }
    }

    /// Extrapolate burnout from the last 14 daily records (by date).
    pub fn predict_burnout(history: &[ScoreRecord]) -> BurnoutForecast {
        let mut daily: Vec<&ScoreRecord> = history
            .iter()
            .filter(|r| r.score_type == ScoreType::Daily)
            .collect();
        if daily.is_empty() {
            return BurnoutForecast::InsufficientData;
        }
        daily.sort_by_key(|r| r.date);
        let window = &daily[daily.len().saturating_sub(TREND_WINDOW_DAYS)..];
        let recent = &window[window.len().saturating_sub(TREND_RECENT_DAYS)..];

        let avg = window.iter().map(|r| r.burnout_risk_index).sum::<f64>() / window.len() as f64;
        let recent_avg = recent.iter().map(|r| r.burnout_risk_index).sum::<f64>() / recent.len() as f64;
        let delta = recent_avg - avg;
        let predicted = round_to((avg + delta * 2.0).clamp(0.0, 1.0), 2);

        let trend = if delta > TREND_THRESHOLD {
            Trend::Increasing
        } else if delta < -TREND_THRESHOLD {
            Trend::Decreasing
        } else {
            Trend::Stable
        };
        let risk_level = BurnoutLabel::from_risk(predicted);

        BurnoutForecast::Predicted(BurnoutPrediction {
            predicted_risk: predicted,
            risk_level,
            trend,
            trend_delta: round_to(delta, 3),
            based_on_days: window.len(),
            recommendation: risk_level.recommendation().to_string(),
        })
    }
}

fn mean(values: impl Iterator<Item = u8>) -> Option<f64> {
    let (sum, count) = values.fold((0u32, 0u32), |(s, c), v| (s + u32::from(v), c + 1));
    (count > 0).then(|| f64::from(sum) / f64::from(count))
}

/// Score records keyed by (date, type); writing a key replaces the whole record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBook {
    records: BTreeMap<(NaiveDate, ScoreType), ScoreRecord>,
}

impl ScoreBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = ScoreRecord>) -> Self {
        let mut book = Self::new();
        for r in records {
            book.upsert(r);
        }
        book
    }

    /// Insert or overwrite, returning the replaced record.
    pub fn upsert(&mut self, record: ScoreRecord) -> Option<ScoreRecord> {
        self.records.insert((record.date, record.score_type), record)
    }

    pub fn get(&self, date: NaiveDate, score_type: ScoreType) -> Option<&ScoreRecord> {
        self.records.get(&(date, score_type))
    }

    /// Daily records on or after `since`, oldest first.
    pub fn daily_since(&self, since: NaiveDate) -> Vec<ScoreRecord> {
        self.records
            .range((since, ScoreType::Daily)..)
            .filter(|(k, _)| k.1 == ScoreType::Daily)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ScoreRecord> {
        self.records.into_values().collect()
    }
}
