//! dayflow-core: scheduling and scoring engine for the Dayflow planner.
//!
//! Everything here is synchronous and pure over in-memory records: the caller
//! loads tasks, availability, energy and execution history, and persists what
//! comes back. The one artifact the engine owns is the learned focus model,
//! reached through an injected [`ModelStore`].

pub mod availability;
pub mod candidates;
pub mod energy;
pub mod error;
pub mod execution;
pub mod learned;
pub mod planner;
pub mod recommender;
pub mod score;
pub mod store;
pub mod task;
pub mod time;

pub use availability::{build_day_windows, Availability, DayOfWeek, DayWindows, TimeWindow};
pub use candidates::{candidate_count, generate_candidates, CANDIDATE_STEP_MINUTES};
pub use energy::{EnergyPeriod, EnergyProfile, EnergyRequired, DEFAULT_ENERGY_LEVEL};
pub use error::ModelStoreError;
pub use execution::Execution;
pub use learned::{
    training_samples, FeatureVector, FocusPredictor, HeuristicOnly, LearnedAdjustment,
    RidgeFocusModel, TrainOutcome, HEURISTIC_TAG, LEARNED_TAG, MIN_TRAINING_SAMPLES,
};
pub use planner::{
    detect_overload, rank_by_composite, ClassicPlanningEngine, OverloadReport, PlanningConfig,
    PlanningSlot,
};
pub use recommender::{CriteriaBreakdown, Recommendation, ScoredCandidate, SmartRecommender};
pub use score::{
    select_day_inputs, BurnoutForecast, BurnoutLabel, BurnoutPrediction, DayInputs, ScoreBook,
    ScoreCalculator, ScoreRecord, ScoreType, Trend, WeeklySummary,
};
pub use store::{FileModelStore, MemoryModelStore, ModelStore, NullModelStore};
pub use task::{Priority, Task, TaskStatus};
