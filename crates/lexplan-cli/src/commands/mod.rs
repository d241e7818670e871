//! Subcommand implementations and shared plumbing.

pub mod generate;
pub mod init;
pub mod schedule;
pub mod status;
pub mod validate;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use lexplan_core::memory::MemoryModel;
use lexplan_core::model::{Category, LearningPlan};
use lexplan_core::parser;
use lexplan_core::pool::ContentPool;
use lexplan_core::scheduler::ReviewScheduler;
use lexplan_core::selector::{CategoryState, DailySelector};
use lexplan_store::{ProgressStore, Snapshot, StateKey};

/// A plan with its per-category state checked out of the store.
pub(crate) struct Session {
    pub plan: LearningPlan,
    pub selector: DailySelector,
    store: ProgressStore,
    /// Version each snapshot was loaded at, for conflict detection.
    loaded_versions: BTreeMap<Category, u64>,
}

/// Load the plan and catalog, then check out every configured category's
/// state from the store.
pub(crate) fn open_session(
    plan_path: &Path,
    catalog_path: &Path,
    store: ProgressStore,
) -> Result<Session> {
    let plan = parser::load_plan(plan_path)?;
    let catalog = parser::load_catalog(catalog_path)?;

    let mut categories = BTreeMap::new();
    let mut loaded_versions = BTreeMap::new();
    for (category, cat_plan) in &plan.categories {
        let key = StateKey::new(&plan.subject, plan.stage, *category);
        let snapshot = store.load(&key);
        loaded_versions.insert(*category, snapshot.version);
        categories.insert(
            *category,
            CategoryState {
                pool: ContentPool::from_catalog(&catalog, *category, cat_plan, snapshot.cycle),
                scheduler: ReviewScheduler::new(MemoryModel::default(), snapshot.memory),
            },
        );
    }

    let selector = DailySelector::new(plan.clone(), categories)?;
    Ok(Session {
        plan,
        selector,
        store,
        loaded_versions,
    })
}

impl Session {
    /// Check all mutated category state back into the store. All-or-
    /// nothing per key: a conflict on any key aborts with the store's
    /// error and leaves that key's prior snapshot authoritative.
    pub fn persist(self) -> Result<()> {
        for (category, state) in self.selector.into_categories() {
            let key = StateKey::new(&self.plan.subject, self.plan.stage, category);
            let snapshot = Snapshot {
                version: self.loaded_versions.get(&category).copied().unwrap_or(0),
                cycle: state.pool.into_cycle(),
                memory: state.scheduler.into_states(),
            };
            self.store.save(&key, &snapshot)?;
        }
        Ok(())
    }
}
