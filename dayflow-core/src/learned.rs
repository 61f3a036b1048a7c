//! Optional learned adjustment for slot scoring.
//!
//! The recommender only sees [`FocusPredictor`]. [`HeuristicOnly`] is the
//! always-untrained implementation; [`LearnedAdjustment`] wraps a ridge
//! regression of recorded focus scores, persisted through an injected
//! [`ModelStore`]. Training is opportunistic: below [`MIN_TRAINING_SAMPLES`]
//! it is a no-op and the component stays heuristic-only.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::energy::EnergyProfile;
use crate::error::ModelStoreError;
use crate::execution::Execution;
use crate::store::{ModelStore, NullModelStore};
use crate::task::Task;

pub const MIN_TRAINING_SAMPLES: usize = 20;
pub const HEURISTIC_TAG: &str = "heuristic-v1";
pub const LEARNED_TAG: &str = "ridge-v1";
pub const MODEL_FORMAT_VERSION: u32 = 1;

pub const FEATURE_COUNT: usize = 7;
const RIDGE_LAMBDA: f64 = 1.0;
const FOCUS_MIN: f64 = 1.0;
const FOCUS_MAX: f64 = 10.0;

/// hour, weekday (Mon = 0), duration, priority ordinal, energy ordinal,
/// postpone count, energy level at the hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn extract(task: &Task, start: NaiveDateTime, energy: &EnergyProfile) -> Self {
        Self([
            f64::from(start.hour()),
            f64::from(start.weekday().num_days_from_monday()),
            f64::from(task.estimated_duration_minutes),
            f64::from(task.priority.ordinal()),
            f64::from(task.energy_required.ordinal()),
            f64::from(task.postpone_count),
            f64::from(energy.level_at(start)),
        ])
    }
}

pub trait FocusPredictor {
    fn is_trained(&self) -> bool;

    /// Predicted focus score in [1, 10], or `None` when untrained.
    fn predict_focus(&self, features: &FeatureVector) -> Option<f64>;

    fn model_tag(&self) -> &str;
}

impl<P: FocusPredictor + ?Sized> FocusPredictor for &P {
    fn is_trained(&self) -> bool {
        (**self).is_trained()
    }

    fn predict_focus(&self, features: &FeatureVector) -> Option<f64> {
        (**self).predict_focus(features)
    }

    fn model_tag(&self) -> &str {
        (**self).model_tag()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicOnly;

impl FocusPredictor for HeuristicOnly {
    fn is_trained(&self) -> bool {
        false
    }

    fn predict_focus(&self, _features: &FeatureVector) -> Option<f64> {
        None
    }

    fn model_tag(&self) -> &str {
        HEURISTIC_TAG
    }
}

/// Standardized ridge regression of focus score on [`FeatureVector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeFocusModel {
    pub version: u32,
    pub means: [f64; FEATURE_COUNT],
    pub scales: [f64; FEATURE_COUNT],
    pub weights: [f64; FEATURE_COUNT],
    pub intercept: f64,
    pub samples: usize,
}

impl RidgeFocusModel {
    /// Closed-form fit; `None` below the sample floor or on a degenerate system.
    pub fn fit(samples: &[(FeatureVector, f64)]) -> Option<Self> {
        if samples.len() < MIN_TRAINING_SAMPLES {
            return None;
        }
        let n = samples.len() as f64;

        let mut means = [0.0; FEATURE_COUNT];
        for (x, _) in samples {
            for j in 0..FEATURE_COUNT {
                means[j] += x.0[j] / n;
            }
        }
        let mut scales = [0.0; FEATURE_COUNT];
        for (x, _) in samples {
            for j in 0..FEATURE_COUNT {
                scales[j] += (x.0[j] - means[j]).powi(2) / n;
            }
        }
        for s in scales.iter_mut() {
            *s = s.sqrt();
            if *s < 1e-9 {
                *s = 1.0;
            }
        }

        let y_mean = samples.iter().map(|(_, y)| y).sum::<f64>() / n;

        let mut gram = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
        let mut rhs = [0.0; FEATURE_COUNT];
        for (x, y) in samples {
            let z = standardize(&x.0, &means, &scales);
            for i in 0..FEATURE_COUNT {
                rhs[i] += z[i] * (y - y_mean);
                for j in 0..FEATURE_COUNT {
                    gram[i][j] += z[i] * z[j];
                }
            }
        }
        for (i, row) in gram.iter_mut().enumerate() {
            row[i] += RIDGE_LAMBDA;
        }

        let weights = solve(gram, rhs)?;
        if !weights.iter().all(|w| w.is_finite()) {
            return None;
        }

        Some(Self {
            version: MODEL_FORMAT_VERSION,
            means,
            scales,
            weights,
            intercept: y_mean,
            samples: samples.len(),
        })
    }

    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let z = standardize(&features.0, &self.means, &self.scales);
        let raw = self.intercept + z.iter().zip(&self.weights).map(|(z, w)| z * w).sum::<f64>();
        raw.clamp(FOCUS_MIN, FOCUS_MAX)
    }
}

impl FocusPredictor for RidgeFocusModel {
    fn is_trained(&self) -> bool {
        true
    }

    fn predict_focus(&self, features: &FeatureVector) -> Option<f64> {
        let p = self.predict(features);
        p.is_finite().then_some(p)
    }

    fn model_tag(&self) -> &str {
        LEARNED_TAG
    }
}

fn standardize(
    x: &[f64; FEATURE_COUNT],
    means: &[f64; FEATURE_COUNT],
    scales: &[f64; FEATURE_COUNT],
) -> [f64; FEATURE_COUNT] {
    let mut z = [0.0; FEATURE_COUNT];
    for j in 0..FEATURE_COUNT {
        z[j] = (x[j] - means[j]) / scales[j];
    }
    z
}

/// Gaussian elimination with partial pivoting.
fn solve<const N: usize>(mut a: [[f64; N]; N], mut b: [f64; N]) -> Option<[f64; N]> {
    for col in 0..N {
        let pivot = (col..N).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..N {
            let factor = a[row][col] / a[col][col];
            for k in col..N {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; N];
    for row in (0..N).rev() {
        let mut acc = b[row];
        for k in row + 1..N {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }
    Some(x)
}

/// Join executions with their tasks, keeping only sessions with a recorded focus score.
pub fn training_samples(
    tasks: &[Task],
    executions: &[Execution],
    energy: &EnergyProfile,
) -> Vec<(FeatureVector, f64)> {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    executions
        .iter()
        .filter_map(|e| {
            let task = by_id.get(e.task_id.as_str())?;
            let focus = e.recorded_focus()?;
            Some((FeatureVector::extract(task, e.started_at, energy), f64::from(focus)))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOutcome {
    /// Not enough labelled history; the previous model (if any) stays in place.
    Skipped { usable: usize },
    Trained { samples: usize },
}

/// The learned capability plus the store its snapshots are published to.
#[derive(Debug)]
pub struct LearnedAdjustment<S: ModelStore> {
    store: S,
    model: Option<Arc<RidgeFocusModel>>,
}

impl LearnedAdjustment<NullModelStore> {
    /// Permanently heuristic-only.
    pub fn disabled() -> Self {
        Self {
            store: NullModelStore,
            model: None,
        }
    }
}

impl<S: ModelStore> LearnedAdjustment<S> {
    /// Load the last published model. An unreadable artifact leaves the component untrained.
    pub fn open(store: S) -> Self {
        let mut this = Self { store, model: None };
        this.reload();
        this
    }

    pub fn reload(&mut self) {
        match self.store.load() {
            Ok(model) => self.model = model.map(Arc::new),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable focus model, staying heuristic-only");
                self.model = None;
            }
        }
    }

    pub fn train(
        &mut self,
        tasks: &[Task],
        executions: &[Execution],
        energy: &EnergyProfile,
    ) -> Result<TrainOutcome, ModelStoreError> {
        let samples = training_samples(tasks, executions, energy);
        if executions.len() < MIN_TRAINING_SAMPLES {
            tracing::info!(
                count = executions.len(),
                usable = samples.len(),
                "not enough executions to train focus model"
            );
            return Ok(TrainOutcome::Skipped {
                usable: samples.len(),
            });
        }

        let Some(model) = RidgeFocusModel::fit(&samples) else {
            tracing::info!(usable = samples.len(), "not enough labelled samples to train focus model");
            return Ok(TrainOutcome::Skipped {
                usable: samples.len(),
            });
        };

        self.store.save(&model)?;
        let trained = model.samples;
        self.model = Some(Arc::new(model));
        tracing::info!(samples = trained, "focus model trained");
        Ok(TrainOutcome::Trained { samples: trained })
    }

    pub fn snapshot(&self) -> Option<Arc<RidgeFocusModel>> {
        self.model.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ModelStore> FocusPredictor for LearnedAdjustment<S> {
    fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn predict_focus(&self, features: &FeatureVector) -> Option<f64> {
        self.model.as_ref()?.predict_focus(features)
    }

    fn model_tag(&self) -> &str {
        match &self.model {
            Some(m) => m.model_tag(),
            None => HEURISTIC_TAG,
        }
    }
}
