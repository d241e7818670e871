//! Daily selection orchestrator.
//!
//! Composes the content pool and the review scheduler into one day's
//! teaching load: new items paced so each pass over the pool is
//! introduced evenly and completely, remaining capacity filled with due
//! reviews, and excess reviews deferred untouched so they are never
//! silently dropped.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::ConfigError;
use crate::model::{Category, CategoryPlan, DailyPlan, LearningPlan};
use crate::parser::validate_plan;
use crate::pool::ContentPool;
use crate::scheduler::ReviewScheduler;

/// The checked-out working state of one (stage, category) key.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub pool: ContentPool,
    pub scheduler: ReviewScheduler,
}

/// Produces one day's teaching load from a plan and checked-out state.
#[derive(Debug, Clone)]
pub struct DailySelector {
    plan: LearningPlan,
    categories: BTreeMap<Category, CategoryState>,
}

impl DailySelector {
    /// Build a selector over a validated plan. Fails closed on malformed
    /// plan configuration.
    pub fn new(
        plan: LearningPlan,
        categories: BTreeMap<Category, CategoryState>,
    ) -> Result<Self, ConfigError> {
        validate_plan(&plan)?;
        Ok(Self { plan, categories })
    }

    pub fn plan(&self) -> &LearningPlan {
        &self.plan
    }

    pub fn category_state(&self, category: Category) -> Option<&CategoryState> {
        self.categories.get(&category)
    }

    /// Assemble the plan for `date` and apply the selection side effects
    /// (mark new items learned, advance reviewed states). Persistence of
    /// the mutated state is the caller's job.
    pub fn select_day(&mut self, date: NaiveDate) -> Result<DailyPlan, ConfigError> {
        let day_index = self
            .plan
            .day_index(date)
            .ok_or(ConfigError::DateBeforePlanStart {
                date,
                start: self.plan.start_date,
            })?;

        let mut new_items = Vec::new();
        let mut review_items = Vec::new();
        let mut achieved_mix: BTreeMap<String, u32> = BTreeMap::new();

        for category in Category::ALL {
            let Some(cat_plan) = self.plan.categories.get(&category) else {
                continue;
            };
            let Some(state) = self.categories.get_mut(&category) else {
                tracing::debug!(%category, "no checked-out state for category, skipping");
                continue;
            };

            let mut rng = ChaCha8Rng::seed_from_u64(
                self.plan.seed ^ (day_index as u64).wrapping_mul(1000) ^ category.ordinal(),
            );

            let request = new_item_request(cat_plan, &state.pool);
            let picked = state
                .pool
                .select_unlearned(request, &cat_plan.tag_quotas, &mut rng);

            // Introductions first: an item re-selected as new in a later
            // pass must not also surface in the same day's review queue.
            state.pool.mark_learned(picked.iter().map(|i| i.id.as_str()));
            for item in &picked {
                state.scheduler.introduce(item, date);
            }

            // Unused new-item slots roll over to the review budget.
            let capacity = cat_plan.daily_review_count as usize
                + (cat_plan.daily_learn_count as usize).saturating_sub(picked.len());
            let due = state.scheduler.due_items(date);
            let take = due.len().min(capacity);
            if due.len() > take {
                tracing::debug!(
                    %category,
                    deferred = due.len() - take,
                    "review load exceeds capacity, deferring lowest-priority items"
                );
            }
            let reviews = &due[..take];

            state.scheduler.advance(reviews, date);
            state.pool.note_day(date);

            for item in &picked {
                *achieved_mix.entry(item.tag.clone()).or_default() += 1;
                new_items.push(item.id.clone());
            }
            review_items.extend_from_slice(reviews);
        }

        Ok(DailyPlan {
            date,
            day_index,
            new_items,
            review_items,
            achieved_mix,
        })
    }

    /// Generate `days` consecutive plans starting at `from` without
    /// touching this selector's state.
    pub fn preview(&self, from: NaiveDate, days: u32) -> Result<Vec<DailyPlan>, ConfigError> {
        let mut scratch = self.clone();
        let mut plans = Vec::with_capacity(days as usize);
        for offset in 0..days as i64 {
            plans.push(scratch.select_day(from + Duration::days(offset))?);
        }
        Ok(plans)
    }

    /// Hand the mutated per-category state back for persistence.
    pub fn into_categories(self) -> BTreeMap<Category, CategoryState> {
        self.categories
    }
}

/// New items to request for one day.
///
/// The per-day quota is `daily_learn_count` capped by
/// `ceil(total_count / total_study_cycles)`, and further capped by what
/// remains of the current pass so the pool is introduced evenly and
/// completely. Once a pass is complete the cap lifts again; the pool's
/// reset logic then starts the next pass.
fn new_item_request(cat_plan: &CategoryPlan, pool: &ContentPool) -> usize {
    if cat_plan.daily_learn_count == 0 || pool.is_empty() {
        return 0;
    }
    let per_day = cat_plan
        .daily_learn_count
        .min(cat_plan.total_count.div_ceil(cat_plan.total_study_cycles));
    let pass_size = cat_plan.total_count.min(pool.len() as u32);
    let remaining = pass_size.saturating_sub(pool.cycle().learned_items.len() as u32);
    if remaining == 0 {
        per_day as usize
    } else {
        per_day.min(remaining) as usize
    }
}
