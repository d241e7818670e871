//! The `lexplan generate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::Table;

use lexplan_core::model::DailyPlan;
use lexplan_store::ProgressStore;

use crate::commands::open_session;
use crate::config::load_config_from;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    plan: PathBuf,
    catalog: PathBuf,
    date: Option<chrono::NaiveDate>,
    state_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    dry_run: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let cfg = load_config_from(config.as_deref())?;
    let state_dir = state_dir.unwrap_or(cfg.state_dir);
    let output_dir = output.unwrap_or(cfg.output_dir);
    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut session = open_session(&plan, &catalog, ProgressStore::new(state_dir))?;
    let daily = session.selector.select_day(date)?;

    if dry_run {
        tracing::info!("dry run, state not persisted");
    } else {
        session.persist()?;
    }

    let formats: Vec<&str> = if format == "all" {
        vec!["table", "json"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "table" => print_daily(&daily),
            "json" => {
                std::fs::create_dir_all(&output_dir).with_context(|| {
                    format!("failed to create output directory {}", output_dir.display())
                })?;
                let path = output_dir.join(format!("daily-{}.json", daily.date));
                let json = serde_json::to_string_pretty(&daily)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Daily plan saved to: {}", path.display());
            }
            _ => eprintln!("Unknown format: {fmt}"),
        }
    }

    Ok(())
}

fn print_daily(daily: &DailyPlan) {
    println!(
        "Day {} ({}): {} new, {} review",
        daily.day_index,
        daily.date,
        daily.new_items.len(),
        daily.review_items.len()
    );

    let mut table = Table::new();
    table.set_header(vec!["Section", "Count", "Items"]);
    table.add_row(vec![
        "New".to_string(),
        daily.new_items.len().to_string(),
        daily.new_items.join(", "),
    ]);
    table.add_row(vec![
        "Review".to_string(),
        daily.review_items.len().to_string(),
        daily.review_items.join(", "),
    ]);
    println!("{table}");

    if !daily.achieved_mix.is_empty() {
        let mix: Vec<String> = daily
            .achieved_mix
            .iter()
            .map(|(tag, count)| format!("{tag}: {count}"))
            .collect();
        println!("Mix: {}", mix.join(", "));
    }
}
