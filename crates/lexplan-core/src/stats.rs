//! Aggregate memory statistics.
//!
//! Summarizes a state key's tracked items for operator-facing status
//! output: how much is tracked, how stable it is on average, and how the
//! difficulty distribution skews.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::memory::{MemoryPhase, MemoryState};

/// Difficulty distribution buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultySpread {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

/// Aggregate statistics over one state key's memory map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Number of tracked items.
    pub tracked: usize,
    /// Items per lifecycle phase.
    pub by_phase: BTreeMap<MemoryPhase, usize>,
    /// Mean stability in days (0.0 when nothing is tracked).
    pub avg_stability: f64,
    /// Mean difficulty (0.0 when nothing is tracked).
    pub avg_difficulty: f64,
    /// Difficulty buckets: easy <= 3.5 < medium <= 6.5 < hard.
    pub difficulty_spread: DifficultySpread,
    /// Items due on the reference date.
    pub due: usize,
}

impl MemoryStats {
    /// Compute statistics over `states` as of `as_of`.
    pub fn compute<'a>(
        states: impl IntoIterator<Item = &'a MemoryState>,
        as_of: NaiveDate,
    ) -> Self {
        let mut tracked = 0usize;
        let mut by_phase: BTreeMap<MemoryPhase, usize> = BTreeMap::new();
        let mut stability_sum = 0.0;
        let mut difficulty_sum = 0.0;
        let mut spread = DifficultySpread::default();
        let mut due = 0usize;

        for state in states {
            tracked += 1;
            *by_phase.entry(state.phase).or_default() += 1;
            stability_sum += state.stability;
            difficulty_sum += state.difficulty;
            if state.difficulty <= 3.5 {
                spread.easy += 1;
            } else if state.difficulty <= 6.5 {
                spread.medium += 1;
            } else {
                spread.hard += 1;
            }
            if state.phase != MemoryPhase::New && state.due <= as_of {
                due += 1;
            }
        }

        let n = tracked.max(1) as f64;
        MemoryStats {
            tracked,
            by_phase,
            avg_stability: if tracked == 0 { 0.0 } else { stability_sum / n },
            avg_difficulty: if tracked == 0 { 0.0 } else { difficulty_sum / n },
            difficulty_spread: spread,
            due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(phase: MemoryPhase, stability: f64, difficulty: f64, due: NaiveDate) -> MemoryState {
        MemoryState {
            phase,
            stability,
            difficulty,
            review_count: 1,
            lapse_count: 0,
            last_reviewed: date(2025, 1, 1),
            due,
        }
    }

    #[test]
    fn empty_states_give_zeroes() {
        let stats = MemoryStats::compute(std::iter::empty::<&MemoryState>(), date(2025, 1, 1));
        assert_eq!(stats.tracked, 0);
        assert_eq!(stats.avg_stability, 0.0);
        assert_eq!(stats.due, 0);
    }

    #[test]
    fn averages_and_buckets() {
        let states = [
            state(MemoryPhase::Review, 2.0, 2.0, date(2025, 1, 3)),
            state(MemoryPhase::Review, 4.0, 5.0, date(2025, 1, 10)),
            state(MemoryPhase::Learning, 6.0, 8.0, date(2025, 1, 2)),
        ];
        let stats = MemoryStats::compute(states.iter(), date(2025, 1, 5));
        assert_eq!(stats.tracked, 3);
        assert!((stats.avg_stability - 4.0).abs() < 1e-9);
        assert!((stats.avg_difficulty - 5.0).abs() < 1e-9);
        assert_eq!(stats.difficulty_spread.easy, 1);
        assert_eq!(stats.difficulty_spread.medium, 1);
        assert_eq!(stats.difficulty_spread.hard, 1);
        assert_eq!(stats.due, 2);
        assert_eq!(stats.by_phase[&MemoryPhase::Review], 2);
    }

    #[test]
    fn new_items_are_not_counted_due() {
        let states = [state(MemoryPhase::New, 2.5, 5.0, date(2025, 1, 1))];
        let stats = MemoryStats::compute(states.iter(), date(2025, 1, 5));
        assert_eq!(stats.due, 0);
    }
}
