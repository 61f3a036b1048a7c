//! Smart recommender: explainable best-slot choice for a single task.
//!
//! Every candidate placement is scored on energy fit, priority, postponement
//! history and a morning bonus, optionally nudged by a learned focus
//! prediction. The winner comes with its criteria breakdown, a confidence
//! derived from the gap to the runner-up, and a plain-text explanation.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::availability::TimeWindow;
use crate::candidates::generate_candidates;
use crate::energy::{EnergyProfile, EnergyRequired};
use crate::learned::{FeatureVector, FocusPredictor, HeuristicOnly};
use crate::task::Task;
use crate::time::round_to;

const WEIGHT_ENERGY: f64 = 0.35;
const WEIGHT_PRIORITY: f64 = 0.30;
const WEIGHT_POSTPONE: f64 = 0.15;
const WEIGHT_ML: f64 = 0.20;
const MORNING_BONUS: f64 = 0.2;
const SINGLE_CANDIDATE_CONFIDENCE: f64 = 0.7;

/// Sub-scores of one candidate, rounded as reported (2 decimals, total 3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriteriaBreakdown {
    pub energy_match: f64,
    pub priority_score: f64,
    pub postpone_penalty: f64,
    pub morning_bonus: f64,
    pub ml_boost: f64,
    pub total: f64,
}

impl CriteriaBreakdown {
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("energy_match".to_string(), self.energy_match),
            ("priority_score".to_string(), self.priority_score),
            ("postpone_penalty".to_string(), self.postpone_penalty),
            ("morning_bonus".to_string(), self.morning_bonus),
            ("ml_boost".to_string(), self.ml_boost),
            ("total".to_string(), self.total),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub window: TimeWindow,
    pub criteria: CriteriaBreakdown,
}

/// Recommended placement for one task. Only `accepted` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub task_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub confidence: f64,
    pub criteria: CriteriaBreakdown,
    pub explanation: String,
    pub model_tag: String,
    #[serde(default)]
    pub accepted: Option<bool>,
}

impl Recommendation {
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end,
        }
    }

    pub fn accept(&mut self) {
        self.accepted = Some(true);
    }

    pub fn reject(&mut self) {
        self.accepted = Some(false);
    }
}

/// Energy fit in [0, 1] of `level` against what the task requires.
pub fn energy_match(required: EnergyRequired, level: u8) -> f64 {
    let level = f64::from(level);
    let min = f64::from(required.threshold());
    match required {
        EnergyRequired::High => (level / min.max(7.0)).min(1.0),
        _ if level >= min => 1.0,
        _ => level / min,
    }
}

/// 0.5 plus half the lead over the runner-up, capped at 1; a lone candidate gets 0.7.
pub fn confidence(ranked: &[ScoredCandidate]) -> Option<f64> {
    match ranked {
        [] => None,
        [_] => Some(SINGLE_CANDIDATE_CONFIDENCE),
        [top, runner_up, ..] => {
            let gap = top.criteria.total - runner_up.criteria.total;
            Some((0.5 + gap * 0.5).clamp(0.0, 1.0))
        }
    }
}

pub fn build_explanation(task: &Task, c: &CriteriaBreakdown) -> String {
    let mut lines = vec![
        format!("Task '{}' placed using the following criteria:", task.title),
        format!("- Energy alignment: {:.0}%", c.energy_match * 100.0),
        format!("- Priority: {:.0}%", c.priority_score * 100.0),
        format!("- Postponement factor: {:.0}%", c.postpone_penalty * 100.0),
    ];
    if c.morning_bonus > 0.0 {
        lines.push("- Morning slot bonus applied".to_string());
    }
    if c.ml_boost.abs() > 0.01 {
        lines.push(format!("- Learned adjustment: {:+.2}", c.ml_boost));
    }
    lines.push(format!("- Total score: {:.3}", c.total));
    lines.join("\n")
}

#[derive(Debug, Clone)]
pub struct SmartRecommender<P = HeuristicOnly> {
    energy: EnergyProfile,
    predictor: P,
}

impl SmartRecommender<HeuristicOnly> {
    pub fn heuristic(energy: EnergyProfile) -> Self {
        Self::new(energy, HeuristicOnly)
    }
}

impl<P: FocusPredictor> SmartRecommender<P> {
    pub fn new(energy: EnergyProfile, predictor: P) -> Self {
        Self { energy, predictor }
    }

    pub fn model_tag(&self) -> &str {
        self.predictor.model_tag()
    }

    pub fn score_candidate(&self, task: &Task, window: &TimeWindow) -> CriteriaBreakdown {
        let start = window.start;
        let hour = start.hour();

        let energy = energy_match(task.energy_required, self.energy.level_at(start));
        let priority = task.priority.normalized();
        let postpone = task.postpone_penalty();
        let morning = if (8..12).contains(&hour) { MORNING_BONUS } else { 0.0 };

        let ml_boost = if self.predictor.is_trained() {
            let features = FeatureVector::extract(task, start, &self.energy);
            self.predictor
                .predict_focus(&features)
                .map(|focus| (focus - 5.0) / 10.0)
                .unwrap_or(0.0)
        } else {
            0.0
        };

        let total = energy * WEIGHT_ENERGY
            + priority * WEIGHT_PRIORITY
            + postpone * WEIGHT_POSTPONE
            + morning
            + ml_boost * WEIGHT_ML;

        CriteriaBreakdown {
            energy_match: round_to(energy, 2),
            priority_score: round_to(priority, 2),
            postpone_penalty: round_to(postpone, 2),
            morning_bonus: round_to(morning, 2),
            ml_boost: round_to(ml_boost, 2),
            total: round_to(total, 3),
        }
    }

    /// All candidates, best first; equal totals keep chronological order.
    pub fn rank_candidates(&self, task: &Task, windows: &[TimeWindow]) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = generate_candidates(windows, task.estimated_duration_minutes)
            .into_iter()
            .map(|window| ScoredCandidate {
                criteria: self.score_candidate(task, &window),
                window,
            })
            .collect();
        ranked.sort_by(|a, b| b.criteria.total.total_cmp(&a.criteria.total));
        ranked
    }

    /// `None` when there are no windows or nothing fits the task's duration.
    pub fn recommend_slot(&self, task: &Task, windows: &[TimeWindow]) -> Option<Recommendation> {
        let ranked = self.rank_candidates(task, windows);
        let confidence = confidence(&ranked)?;
        let best = ranked[0];

        tracing::debug!(
            task = %task.id,
            candidates = ranked.len(),
            start = %best.window.start,
            total = best.criteria.total,
            confidence,
            "slot recommended"
        );

        Some(Recommendation {
            task_id: task.id.clone(),
            start: best.window.start,
            end: best.window.end,
            confidence: round_to(confidence, 2),
            criteria: best.criteria,
            explanation: build_explanation(task, &best.criteria),
            model_tag: self.predictor.model_tag().to_string(),
            accepted: None,
        })
    }
}
