//! Time-indexed view over checked-out memory state.
//!
//! The scheduler owns the in-memory copy of one state key's
//! [`MemoryState`] map for the duration of a run. It answers "what is due
//! on date X", applies the memory model to items that were shown, and
//! hands the updated map back for persistence. It never touches disk.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::memory::{MemoryModel, MemoryPhase, MemoryState};
use crate::model::LearningItem;

/// Scheduler over one (stage, category) key's memory states.
#[derive(Debug, Clone)]
pub struct ReviewScheduler {
    model: MemoryModel,
    states: BTreeMap<String, MemoryState>,
    /// Items advanced within this run, per date: a reviewed item is never
    /// re-offered as due on the same date again.
    advanced: BTreeMap<NaiveDate, BTreeSet<String>>,
}

impl ReviewScheduler {
    /// Check out a state map for a run.
    pub fn new(model: MemoryModel, states: BTreeMap<String, MemoryState>) -> Self {
        Self {
            model,
            states,
            advanced: BTreeMap::new(),
        }
    }

    pub fn model(&self) -> &MemoryModel {
        &self.model
    }

    /// Ids due on `as_of`: tracked, past the `New` phase, and not already
    /// advanced on that date in this run. Ordered oldest-due first, ties
    /// broken by lower difficulty (easier items win when load is
    /// trimmed), then by id.
    pub fn due_items(&self, as_of: NaiveDate) -> Vec<String> {
        let advanced = self.advanced.get(&as_of);
        let mut due: Vec<(&String, &MemoryState)> = self
            .states
            .iter()
            .filter(|(id, state)| {
                state.phase != MemoryPhase::New
                    && state.due <= as_of
                    && !advanced.is_some_and(|set| set.contains(*id))
            })
            .collect();
        due.sort_by(|(a_id, a), (b_id, b)| {
            a.due
                .cmp(&b.due)
                .then(a.difficulty.total_cmp(&b.difficulty))
                .then(a_id.cmp(b_id))
        });
        due.into_iter().map(|(id, _)| id.clone()).collect()
    }

    /// Apply one assumed-success review to each id on `review_date` and
    /// return the updated states. Ids without tracked state are skipped.
    /// Persistence is the store's job, not ours.
    pub fn advance(&mut self, ids: &[String], review_date: NaiveDate) -> Vec<MemoryState> {
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(state) = self.states.get(id) else {
                tracing::debug!(item = %id, "advance skipped untracked item");
                continue;
            };
            let next = self.model.review(state, review_date);
            self.states.insert(id.clone(), next.clone());
            self.advanced.entry(review_date).or_default().insert(id.clone());
            updated.push(next);
        }
        updated
    }

    /// Exposure of an item selected as "new" for the day. On true first
    /// exposure the state is initialized and the introduction-day review
    /// applied, so the item leaves `New` with its first real interval. An
    /// item re-selected in a later pass already has state, which is
    /// advanced instead; memory state is never recreated.
    pub fn introduce(&mut self, item: &LearningItem, date: NaiveDate) -> MemoryState {
        let state = match self.states.get(&item.id) {
            Some(existing) => self.model.review(existing, date),
            None => {
                let initial = self.model.initialize(item, date);
                self.model.review(&initial, date)
            }
        };
        self.states.insert(item.id.clone(), state.clone());
        self.advanced.entry(date).or_default().insert(item.id.clone());
        state
    }

    pub fn contains(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    pub fn state(&self, id: &str) -> Option<&MemoryState> {
        self.states.get(id)
    }

    pub fn states(&self) -> &BTreeMap<String, MemoryState> {
        &self.states
    }

    /// Check the state map back in for persistence.
    pub fn into_states(self) -> BTreeMap<String, MemoryState> {
        self.states
    }
}
