//! Execution telemetry: one record per work session on a task.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub task_id: String,
    pub started_at: NaiveDateTime,
    #[serde(default)]
    pub ended_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub actual_duration_minutes: Option<u32>,
    /// Self-reported 1-10.
    #[serde(default)]
    pub energy_level_during: Option<u8>,
    /// Self-reported 1-10.
    #[serde(default)]
    pub focus_score: Option<u8>,
}

impl Execution {
    pub fn new(task_id: impl Into<String>, started_at: NaiveDateTime) -> Self {
        Self {
            task_id: task_id.into(),
            started_at,
            ended_at: None,
            actual_duration_minutes: None,
            energy_level_during: None,
            focus_score: None,
        }
    }

    pub fn with_focus(mut self, focus: u8) -> Self {
        self.focus_score = Some(focus);
        self
    }

    pub fn with_energy(mut self, energy: u8) -> Self {
        self.energy_level_during = Some(energy);
        self
    }

    pub fn with_actual_minutes(mut self, minutes: u32) -> Self {
        self.actual_duration_minutes = Some(minutes);
        self
    }

    /// Recorded focus, treating 0 as "not recorded".
    pub fn recorded_focus(&self) -> Option<u8> {
        self.focus_score.filter(|f| *f > 0)
    }

    /// Recorded energy, treating 0 as "not recorded".
    pub fn recorded_energy(&self) -> Option<u8> {
        self.energy_level_during.filter(|e| *e > 0)
    }

    /// estimated / actual; 0.0 when either side is unknown or zero.
    pub fn efficiency_ratio(&self, estimated_minutes: u32) -> f64 {
        match self.actual_duration_minutes {
            Some(actual) if actual > 0 && estimated_minutes > 0 => {
                f64::from(estimated_minutes) / f64::from(actual)
            }
            _ => 0.0,
        }
    }
}
