//! The `lexplan schedule` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use lexplan_store::ProgressStore;

use crate::commands::open_session;
use crate::config::load_config_from;

pub fn execute(
    plan: PathBuf,
    catalog: PathBuf,
    from: Option<chrono::NaiveDate>,
    days: u32,
    state_dir: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let cfg = load_config_from(config.as_deref())?;
    let state_dir = state_dir.unwrap_or(cfg.state_dir);

    let session = open_session(&plan, &catalog, ProgressStore::new(state_dir))?;
    let from = from.unwrap_or(session.plan.start_date);
    let preview = session.selector.preview(from, days)?;

    println!(
        "Schedule preview for \"{}\" ({} days from {from}):",
        session.plan.name, days
    );

    let mut table = Table::new();
    table.set_header(vec!["Day", "Date", "New", "Review", "Mix"]);
    for daily in &preview {
        let mix: Vec<String> = daily
            .achieved_mix
            .iter()
            .map(|(tag, count)| format!("{tag}: {count}"))
            .collect();
        table.add_row(vec![
            daily.day_index.to_string(),
            daily.date.to_string(),
            daily.new_items.len().to_string(),
            daily.review_items.len().to_string(),
            mix.join(", "),
        ]);
    }
    println!("{table}");
    println!("Preview only — no state was persisted.");

    Ok(())
}
