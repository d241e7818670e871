//! JSON plan and catalog loading.
//!
//! Plans and catalogs are produced by external collaborators (the plan
//! wizard and the catalog curation tooling); this module loads them,
//! fails closed on malformed plans, and reports non-fatal consistency
//! findings between a plan and the catalog it will run against.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{Category, LearningItem, LearningPlan};

/// Tolerance when checking that proportions sum to 1.0.
const PROPORTION_TOLERANCE: f64 = 1e-6;

/// A catalog file: an ordered collection of items for one or more
/// (stage, category) pairs.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<LearningItem>,
}

/// Load a learning plan from a JSON file and validate it.
pub fn load_plan(path: &Path) -> Result<LearningPlan> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan: {}", path.display()))?;
    let plan: LearningPlan = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse plan: {}", path.display()))?;
    validate_plan(&plan)?;
    Ok(plan)
}

/// Load catalog items from a JSON file, or from every `.json` file in a
/// directory (in file-name order, so the catalog order is stable).
pub fn load_catalog(path: &Path) -> Result<Vec<LearningItem>> {
    if path.is_dir() {
        let mut files: Vec<_> = std::fs::read_dir(path)
            .with_context(|| format!("failed to read catalog directory: {}", path.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut items = Vec::new();
        for file in files {
            items.extend(load_catalog_file(&file)?);
        }
        Ok(items)
    } else {
        load_catalog_file(path)
    }
}

fn load_catalog_file(path: &Path) -> Result<Vec<LearningItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog: {}", path.display()))?;
    let file: CatalogFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse catalog: {}", path.display()))?;
    Ok(file.items)
}

/// Fail-closed plan validation. Every rejected value names the offending
/// field so the caller can surface the message verbatim.
pub fn validate_plan(plan: &LearningPlan) -> Result<(), ConfigError> {
    if plan.duration_days == 0 {
        return Err(ConfigError::invalid("duration_days", "must be at least 1"));
    }
    if plan.categories.is_empty() {
        return Err(ConfigError::invalid(
            "categories",
            "plan configures no categories",
        ));
    }

    for (category, cat_plan) in &plan.categories {
        if cat_plan.total_study_cycles == 0 {
            return Err(ConfigError::invalid(
                &format!("{category}.total_study_cycles"),
                "must be at least 1",
            ));
        }
        if cat_plan.daily_learn_count > 0 && cat_plan.total_count == 0 {
            return Err(ConfigError::invalid(
                &format!("{category}.total_count"),
                "must be at least 1 when daily_learn_count is set",
            ));
        }
        check_proportions(&format!("{category}.stage_mix"), cat_plan.stage_mix.values())?;
        check_proportions(
            &format!("{category}.tag_quotas"),
            cat_plan.tag_quotas.values(),
        )?;
    }
    Ok(())
}

fn check_proportions<'a>(
    field: &str,
    values: impl Iterator<Item = &'a f64>,
) -> Result<(), ConfigError> {
    let mut sum = 0.0;
    let mut any = false;
    for value in values {
        if *value < 0.0 || !value.is_finite() {
            return Err(ConfigError::invalid(
                field,
                "proportions must be finite and non-negative",
            ));
        }
        sum += value;
        any = true;
    }
    if any && (sum - 1.0).abs() > PROPORTION_TOLERANCE {
        return Err(ConfigError::BadProportions {
            field: field.to_string(),
            sum,
        });
    }
    Ok(())
}

/// A non-fatal finding from checking a plan against a catalog.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Category the finding applies to, if any.
    pub category: Option<Category>,
    pub message: String,
}

/// Check a plan against the catalog it will run with. These findings are
/// advisory: an undersupplied pool still runs (the pool returns what it
/// has), but the operator probably wants to know.
pub fn check_catalog(plan: &LearningPlan, catalog: &[LearningItem]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (category, cat_plan) in &plan.categories {
        if cat_plan.daily_learn_count == 0 {
            continue;
        }
        let supply = catalog.iter().filter(|i| i.category == *category).count();
        if supply < cat_plan.total_count as usize {
            warnings.push(ValidationWarning {
                category: Some(*category),
                message: format!(
                    "catalog supplies {supply} {category} items, plan expects {}",
                    cat_plan.total_count
                ),
            });
        }

        let tags: BTreeSet<&str> = catalog
            .iter()
            .filter(|i| i.category == *category)
            .map(|i| i.tag.as_str())
            .collect();
        for tag in cat_plan.tag_quotas.keys() {
            if !tags.contains(tag.as_str()) {
                warnings.push(ValidationWarning {
                    category: Some(*category),
                    message: format!("quota tag `{tag}` has no catalog items"),
                });
            }
        }
    }
    warnings
}
