//! Forgetting-curve memory model.
//!
//! Implements the per-item memory state and the pure update function that
//! advances it. The model is FSRS-style: each item carries a stability
//! (expected days until recall probability decays to the reference
//! threshold) and a difficulty in [1, 10] governing stability growth.
//!
//! The surrounding system has no channel reporting whether the learner
//! actually recalled an item, so every scheduled exposure is treated as a
//! successful recall; `review` therefore takes no grade parameter. Given
//! identical inputs the output is always identical: there is no hidden
//! randomness, which is what makes whole plans reproducible.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::LearningItem;

/// Forgetting-curve shape: R = (1 + FACTOR * t / S) ^ DECAY.
const FORGETTING_FACTOR: f64 = 19.0 / 81.0;
const FORGETTING_DECAY: f64 = -0.5;

/// Floor below which stability is never allowed to drop.
const MIN_STABILITY: f64 = 0.1;

/// Tunable constants of the memory model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Initial stability in days by difficulty bucket: easy (< 3.5),
    /// medium (3.5 ..= 6.5), hard (> 6.5).
    pub initial_stability: [f64; 3],
    /// Multiplier of the stability growth term.
    pub growth: f64,
    /// Exponent damping growth for already-stable items.
    pub stability_power: f64,
    /// Spread of the retrievability bonus: items closer to being forgotten
    /// gain more stability when recalled.
    pub retention_spread: f64,
    /// Recall probability the next interval is scheduled at.
    pub desired_retention: f64,
    /// Upper clamp for any single interval, in days.
    pub max_interval_days: i64,
    /// Days past due before a review counts as a lapse.
    pub grace_days: i64,
    /// Fraction of stability retained after a lapse.
    pub lapse_factor: f64,
    /// Per-success drift of difficulty toward the easy end.
    pub difficulty_drift: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            initial_stability: [4.0, 2.5, 1.5],
            growth: 4.6015,
            stability_power: 0.112,
            retention_spread: 1.0178,
            desired_retention: 0.9,
            max_interval_days: 365,
            grace_days: 2,
            lapse_factor: 0.5,
            difficulty_drift: 0.02,
        }
    }
}

/// Lifecycle phase of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryPhase {
    /// Initialized but not yet exposed.
    New,
    /// Seen once.
    Learning,
    /// In the regular review rotation.
    Review,
    /// Lapsed out of `Review`; returns on the next exposure.
    Relearning,
}

/// Mutable memory state of one (plan, item) pair.
///
/// Created on first exposure, mutated only by [`MemoryModel::review`],
/// retained for the plan lifetime. Invariant: `due >= last_reviewed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    #[serde(rename = "state")]
    pub phase: MemoryPhase,
    /// Stability in days; always positive.
    pub stability: f64,
    /// Difficulty in [1, 10].
    pub difficulty: f64,
    pub review_count: u32,
    pub lapse_count: u32,
    #[serde(rename = "last_reviewed_date")]
    pub last_reviewed: NaiveDate,
    #[serde(rename = "due_date")]
    pub due: NaiveDate,
}

/// Pure, deterministic updater of [`MemoryState`].
#[derive(Debug, Clone, Default)]
pub struct MemoryModel {
    config: MemoryConfig,
}

impl MemoryModel {
    pub fn new(config: MemoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Create the state for an item's first exposure: due immediately,
    /// stability from the difficulty-bucket table.
    pub fn initialize(&self, item: &LearningItem, today: NaiveDate) -> MemoryState {
        let difficulty = item.weight.clamp(1.0, 10.0);
        MemoryState {
            phase: MemoryPhase::New,
            stability: self.initial_stability(difficulty),
            difficulty,
            review_count: 0,
            lapse_count: 0,
            last_reviewed: today,
            due: today,
        }
    }

    fn initial_stability(&self, difficulty: f64) -> f64 {
        let [easy, medium, hard] = self.config.initial_stability;
        if difficulty < 3.5 {
            easy
        } else if difficulty <= 6.5 {
            medium
        } else {
            hard
        }
    }

    /// Recall probability of `state` on `as_of`, in [0.01, 1.0].
    pub fn retrievability(&self, state: &MemoryState, as_of: NaiveDate) -> f64 {
        let elapsed = as_of.signed_duration_since(state.last_reviewed).num_days();
        if elapsed <= 0 {
            return 1.0;
        }
        let r = (1.0 + FORGETTING_FACTOR * elapsed as f64 / state.stability).powf(FORGETTING_DECAY);
        r.clamp(0.01, 1.0)
    }

    /// Advance `state` for an exposure on `review_date`.
    ///
    /// A `Review`-phase item exposed more than `grace_days` past its due
    /// date lapses: stability is cut to `lapse_factor` of its prior value
    /// and the phase moves to `Relearning`. Every other exposure grows
    /// stability multiplicatively and drifts difficulty toward easy.
    /// The returned due date is always at least one day after
    /// `review_date`, so due dates never move backward.
    pub fn review(&self, state: &MemoryState, review_date: NaiveDate) -> MemoryState {
        let overdue = review_date.signed_duration_since(state.due).num_days();
        let lapsed = state.phase == MemoryPhase::Review && overdue > self.config.grace_days;

        let (phase, stability, difficulty, lapse_count) = if lapsed {
            (
                MemoryPhase::Relearning,
                (state.stability * self.config.lapse_factor).max(MIN_STABILITY),
                state.difficulty,
                state.lapse_count + 1,
            )
        } else {
            let r = self.retrievability(state, review_date);
            let bonus = (self.config.retention_spread * (1.0 - r)).exp() - 1.0;
            let gain = self.config.growth
                * (11.0 - state.difficulty)
                * state.stability.powf(-self.config.stability_power)
                * bonus;
            (
                next_phase(state.phase),
                (state.stability * (1.0 + gain)).max(MIN_STABILITY),
                self.drift_difficulty(state.difficulty),
                state.lapse_count,
            )
        };

        let interval = self.interval_days(stability);
        MemoryState {
            phase,
            stability,
            difficulty,
            review_count: state.review_count + 1,
            lapse_count,
            last_reviewed: review_date,
            due: review_date + Duration::days(interval),
        }
    }

    /// Recall probabilities for the `days` days following the last review.
    pub fn project_retention(&self, state: &MemoryState, days: u32) -> Vec<f64> {
        (1..=days as i64)
            .map(|d| self.retrievability(state, state.last_reviewed + Duration::days(d)))
            .collect()
    }

    fn drift_difficulty(&self, difficulty: f64) -> f64 {
        (1.0 + (difficulty - 1.0) * (1.0 - self.config.difficulty_drift)).clamp(1.0, 10.0)
    }

    fn interval_days(&self, stability: f64) -> i64 {
        let scaled = stability * self.config.desired_retention.ln() / 0.9f64.ln();
        (scaled.round() as i64).clamp(1, self.config.max_interval_days)
    }
}

fn next_phase(phase: MemoryPhase) -> MemoryPhase {
    match phase {
        MemoryPhase::New => MemoryPhase::Learning,
        MemoryPhase::Learning => MemoryPhase::Review,
        MemoryPhase::Review => MemoryPhase::Review,
        MemoryPhase::Relearning => MemoryPhase::Review,
    }
}
