//! The `lexplan status` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use lexplan_core::parser;
use lexplan_core::stats::MemoryStats;
use lexplan_store::{ProgressStore, StateKey};

use crate::config::load_config_from;

pub fn execute(
    plan_path: PathBuf,
    date: Option<chrono::NaiveDate>,
    state_dir: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let cfg = load_config_from(config.as_deref())?;
    let store = ProgressStore::new(state_dir.unwrap_or(cfg.state_dir));
    let plan = parser::load_plan(&plan_path)?;
    let as_of = date.unwrap_or_else(|| chrono::Local::now().date_naive());

    println!("Progress for \"{}\" as of {as_of}:", plan.name);

    let mut table = Table::new();
    table.set_header(vec![
        "Category",
        "Tracked",
        "Due",
        "Avg stability",
        "Avg difficulty",
        "Easy/Med/Hard",
        "Cycle day",
        "Pass progress",
    ]);

    for (category, cat_plan) in &plan.categories {
        let key = StateKey::new(&plan.subject, plan.stage, *category);
        let snapshot = store.load(&key);
        let stats = MemoryStats::compute(snapshot.memory.values(), as_of);
        let spread = stats.difficulty_spread;

        table.add_row(vec![
            category.to_string(),
            stats.tracked.to_string(),
            stats.due.to_string(),
            format!("{:.1}d", stats.avg_stability),
            format!("{:.1}", stats.avg_difficulty),
            format!("{}/{}/{}", spread.easy, spread.medium, spread.hard),
            snapshot.cycle.current_day.to_string(),
            format!(
                "{}/{}",
                snapshot.cycle.learned_items.len(),
                cat_plan.total_count
            ),
        ]);
    }
    println!("{table}");

    Ok(())
}
