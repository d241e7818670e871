//! The `lexplan validate` command.

use std::path::PathBuf;

use anyhow::Result;

use lexplan_core::parser;

pub fn execute(plan_path: PathBuf, catalog_path: Option<PathBuf>) -> Result<()> {
    let plan = parser::load_plan(&plan_path)?;
    println!(
        "Plan: {} ({} categories, {} days)",
        plan.name,
        plan.categories.len(),
        plan.duration_days
    );

    let mut total_warnings = 0;
    if let Some(catalog_path) = catalog_path {
        let catalog = parser::load_catalog(&catalog_path)?;
        let warnings = parser::check_catalog(&plan, &catalog);
        for w in &warnings {
            let prefix = w
                .category
                .map(|c| format!("  [{c}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings = warnings.len();
    }

    if total_warnings == 0 {
        println!("Plan is valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
