//! Non-repeating content pool.
//!
//! Tracks, per (stage, category), which items have been shown in the
//! current pass over the pool and resets exactly when a requested
//! selection cannot be satisfied from the remaining unlearned items.
//! Selection honors grammatical-tag quotas via largest-remainder
//! apportionment and shuffles within each quota bucket with an injected
//! seeded generator, so identical inputs always select identical items.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::model::{Category, CategoryPlan, LearningItem, Stage};

/// Per-(stage, category) pass state over a content pool.
///
/// Ids in `learned` are pairwise distinct; the set is cleared exactly on a
/// cycle reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningCycle {
    /// Items already shown in the current pass.
    #[serde(default)]
    pub learned_items: BTreeSet<String>,
    /// Number of distinct days processed for this key.
    #[serde(default)]
    pub current_day: u32,
    /// Most recent date processed for this key.
    #[serde(default)]
    pub last_date: Option<NaiveDate>,
}

/// Apportion `total` seats across `quotas` by the largest-remainder rule.
///
/// Each bucket gets the floor of its proportional share; leftover seats go
/// to the largest fractional remainders, ties awarded to the
/// lexicographically smaller key. Returns an empty map for empty quotas.
pub fn apportion(total: u32, quotas: &BTreeMap<String, f64>) -> BTreeMap<String, u32> {
    let mut seats: BTreeMap<String, u32> = BTreeMap::new();
    if quotas.is_empty() || total == 0 {
        return seats;
    }

    let mut remainders: Vec<(&String, f64)> = Vec::with_capacity(quotas.len());
    let mut assigned = 0u32;
    for (key, share) in quotas {
        let raw = total as f64 * share;
        let floor = raw.floor() as u32;
        seats.insert(key.clone(), floor);
        remainders.push((key, raw - floor as f64));
        assigned += floor;
    }

    // BTreeMap iteration is key-sorted, so a stable sort on the remainder
    // alone leaves ties in lexicographic key order.
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut leftover = total.saturating_sub(assigned);
    for (key, _) in remainders {
        if leftover == 0 {
            break;
        }
        *seats.get_mut(key).expect("seat entry exists") += 1;
        leftover -= 1;
    }
    seats
}

/// Fair, non-repeating selector over one bounded item pool.
#[derive(Debug, Clone)]
pub struct ContentPool {
    items: Vec<LearningItem>,
    cycle: LearningCycle,
}

impl ContentPool {
    /// Build a pool from its ordered items and the checked-out cycle
    /// state. Ids of items no longer in the pool are dropped from the
    /// learned set so a shrunken catalog cannot wedge the cycle.
    pub fn new(items: Vec<LearningItem>, mut cycle: LearningCycle) -> Self {
        let ids: BTreeSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
        cycle.learned_items.retain(|id| ids.contains(id.as_str()));
        Self { items, cycle }
    }

    /// Build the pool for one category of a plan from the full catalog.
    ///
    /// `total_count` is apportioned across stages by the plan's stage mix
    /// (largest remainder again), taking each stage's items in catalog
    /// order and concatenating in stage order. With no stage mix the pool
    /// is simply the first `total_count` items of the category.
    pub fn from_catalog(
        catalog: &[LearningItem],
        category: Category,
        cat_plan: &CategoryPlan,
        cycle: LearningCycle,
    ) -> Self {
        let of_category: Vec<&LearningItem> =
            catalog.iter().filter(|i| i.category == category).collect();

        let items: Vec<LearningItem> = if cat_plan.stage_mix.is_empty() {
            of_category
                .into_iter()
                .take(cat_plan.total_count as usize)
                .cloned()
                .collect()
        } else {
            let quotas: BTreeMap<String, f64> = cat_plan
                .stage_mix
                .iter()
                .map(|(stage, share)| (stage.to_string(), *share))
                .collect();
            let seats = apportion(cat_plan.total_count, &quotas);
            let mut picked = Vec::with_capacity(cat_plan.total_count as usize);
            for stage in [Stage::Elementary, Stage::Middle, Stage::High] {
                let count = seats.get(&stage.to_string()).copied().unwrap_or(0);
                picked.extend(
                    of_category
                        .iter()
                        .filter(|i| i.stage == stage)
                        .take(count as usize)
                        .map(|i| (*i).clone()),
                );
            }
            picked
        };

        Self::new(items, cycle)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cycle(&self) -> &LearningCycle {
        &self.cycle
    }

    /// Number of items not yet shown in the current pass.
    pub fn unlearned_len(&self) -> usize {
        self.items.len() - self.cycle.learned_items.len()
    }

    /// Draw `n` items from the unlearned pool, honoring `quotas`.
    ///
    /// Quota buckets are filled independently; a bucket shortfall is
    /// covered from other unlearned items before anything else. If the
    /// unlearned pool as a whole cannot satisfy `n`, the learned set is
    /// cleared (a cycle reset) and the draw retries against the full
    /// pool. A pool smaller than `n` is returned whole, the one case
    /// where a selection may come up short.
    pub fn select_unlearned(
        &mut self,
        n: usize,
        quotas: &BTreeMap<String, f64>,
        rng: &mut ChaCha8Rng,
    ) -> Vec<LearningItem> {
        if n == 0 || self.items.is_empty() {
            return Vec::new();
        }

        if self.unlearned_len() < n {
            tracing::info!(
                unlearned = self.unlearned_len(),
                requested = n,
                "pool exhausted, resetting learning cycle"
            );
            self.cycle.learned_items.clear();
        }

        // After a reset the draw runs against the full pool; a pool
        // smaller than `n` simply comes back whole (the documented
        // relaxation for degenerate pools).
        self.draw(n, quotas, rng)
    }

    fn draw(
        &self,
        n: usize,
        quotas: &BTreeMap<String, f64>,
        rng: &mut ChaCha8Rng,
    ) -> Vec<LearningItem> {
        let mut unlearned: Vec<&LearningItem> = self
            .items
            .iter()
            .filter(|i| !self.cycle.learned_items.contains(&i.id))
            .collect();

        if quotas.is_empty() {
            unlearned.shuffle(rng);
            return unlearned.into_iter().take(n).cloned().collect();
        }

        let seats = apportion(n as u32, quotas);
        let mut picked: Vec<LearningItem> = Vec::with_capacity(n);
        let mut taken: BTreeSet<&str> = BTreeSet::new();

        for (tag, count) in &seats {
            let mut bucket: Vec<&LearningItem> =
                unlearned.iter().copied().filter(|i| &i.tag == tag).collect();
            bucket.shuffle(rng);
            for item in bucket.into_iter().take(*count as usize) {
                taken.insert(item.id.as_str());
                picked.push(item.clone());
            }
        }

        // Exhausted buckets are topped up tag-agnostically.
        if picked.len() < n {
            let mut rest: Vec<&LearningItem> = unlearned
                .iter()
                .copied()
                .filter(|i| !taken.contains(i.id.as_str()))
                .collect();
            rest.shuffle(rng);
            picked.extend(rest.into_iter().take(n - picked.len()).cloned());
        }
        picked
    }

    /// Record items as shown in the current pass.
    pub fn mark_learned<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.cycle.learned_items.insert(id.to_string());
        }
    }

    /// Advance the per-key day counter when the date moves forward.
    pub fn note_day(&mut self, date: NaiveDate) {
        if self.cycle.last_date != Some(date) {
            self.cycle.current_day += 1;
            self.cycle.last_date = Some(date);
        }
    }

    /// Check the cycle state back in for persistence.
    pub fn into_cycle(self) -> LearningCycle {
        self.cycle
    }
}
