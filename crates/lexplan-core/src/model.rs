//! Core data model types for lexplan.
//!
//! These are the fundamental types the entire lexplan system uses to
//! represent catalog items, learning plans, and daily output.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content category a learning item belongs to.
///
/// Selection runs per category in this declaration order, so the order is
/// part of the output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vocabulary,
    Morphology,
    Syntax,
}

impl Category {
    /// All categories in selection order.
    pub const ALL: [Category; 3] = [Category::Vocabulary, Category::Morphology, Category::Syntax];

    /// Stable ordinal used for seeding the per-category selection RNG.
    pub fn ordinal(self) -> u64 {
        match self {
            Category::Vocabulary => 0,
            Category::Morphology => 1,
            Category::Syntax => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Vocabulary => write!(f, "vocabulary"),
            Category::Morphology => write!(f, "morphology"),
            Category::Syntax => write!(f, "syntax"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vocabulary" | "vocab" => Ok(Category::Vocabulary),
            "morphology" => Ok(Category::Morphology),
            "syntax" => Ok(Category::Syntax),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// School stage a catalog item is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Elementary,
    Middle,
    High,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Elementary => write!(f, "elementary"),
            Stage::Middle => write!(f, "middle"),
            Stage::High => write!(f, "high"),
        }
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elementary" => Ok(Stage::Elementary),
            "middle" => Ok(Stage::Middle),
            "high" => Ok(Stage::High),
            other => Err(format!("unknown stage: {other}")),
        }
    }
}

/// A single immutable catalog entry.
///
/// Owned by the catalog loader; the core only ever reads it by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningItem {
    /// Unique identifier, stable across runs.
    pub id: String,
    /// The headword or pattern itself.
    pub text: String,
    /// Content category.
    pub category: Category,
    /// Stage the item belongs to.
    pub stage: Stage,
    /// Grammatical tag (part-of-speech for vocabulary, the construct kind
    /// for morphology and syntax).
    pub tag: String,
    /// Intrinsic difficulty weight in [1, 10].
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    5.0
}

/// Per-category scheduling parameters of a learning plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPlan {
    /// New items introduced per day.
    pub daily_learn_count: u32,
    /// Review budget per day, on top of unused new-item slots.
    #[serde(default)]
    pub daily_review_count: u32,
    /// Pool size of one complete pass over the content.
    pub total_count: u32,
    /// How many passes the plan makes over the pool.
    pub total_study_cycles: u32,
    /// Stage proportions the pool is drawn with; must sum to 1.0.
    #[serde(default)]
    pub stage_mix: BTreeMap<Stage, f64>,
    /// Grammatical-tag proportions for new-item selection; must sum to 1.0
    /// when non-empty. Empty means unconstrained.
    #[serde(default)]
    pub tag_quotas: BTreeMap<String, f64>,
}

/// A complete learning plan, produced by an external plan-creation tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPlan {
    /// Unique plan identifier.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Subject the plan belongs to (e.g. "english").
    pub subject: String,
    /// Stage the plan targets; also scopes the persisted state.
    pub stage: Stage,
    /// First calendar day of the plan.
    pub start_date: NaiveDate,
    /// Plan length in days.
    pub duration_days: u32,
    /// Seed for reproducible item selection.
    #[serde(default)]
    pub seed: u64,
    /// Per-category parameters. Categories absent here are not studied.
    #[serde(default)]
    pub categories: BTreeMap<Category, CategoryPlan>,
}

impl LearningPlan {
    /// 1-based index of `date` within the plan, if the date is not before
    /// the plan start.
    pub fn day_index(&self, date: NaiveDate) -> Option<u32> {
        let offset = date.signed_duration_since(self.start_date).num_days();
        if offset < 0 {
            None
        } else {
            Some(offset as u32 + 1)
        }
    }
}

/// One day's teaching load. Immutable once produced and byte-for-byte
/// recomputable from the same persisted state and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    /// The calendar day this plan is for.
    pub date: NaiveDate,
    /// 1-based day index within the learning plan.
    pub day_index: u32,
    /// Newly introduced item ids, in selection order (category-major).
    pub new_items: Vec<String>,
    /// Due review item ids, oldest-due first (category-major).
    pub review_items: Vec<String>,
    /// Grammatical-tag counts achieved over the day's new items.
    pub achieved_mix: BTreeMap<String, u32>,
}

impl DailyPlan {
    /// Total number of items the learner sees on this day.
    pub fn total_items(&self) -> usize {
        self.new_items.len() + self.review_items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn category_display_and_parse() {
        assert_eq!(Category::Vocabulary.to_string(), "vocabulary");
        assert_eq!("vocab".parse::<Category>().unwrap(), Category::Vocabulary);
        assert_eq!(
            "Morphology".parse::<Category>().unwrap(),
            Category::Morphology
        );
        assert_eq!("syntax".parse::<Category>().unwrap(), Category::Syntax);
        assert!("grammar".parse::<Category>().is_err());
    }

    #[test]
    fn stage_display_and_parse() {
        assert_eq!(Stage::Middle.to_string(), "middle");
        assert_eq!("elementary".parse::<Stage>().unwrap(), Stage::Elementary);
        assert_eq!("HIGH".parse::<Stage>().unwrap(), Stage::High);
        assert!("university".parse::<Stage>().is_err());
    }

    #[test]
    fn day_index_from_start() {
        let plan = LearningPlan {
            id: Uuid::nil(),
            name: "test".into(),
            subject: "english".into(),
            stage: Stage::Elementary,
            start_date: date(2025, 1, 1),
            duration_days: 30,
            seed: 0,
            categories: BTreeMap::new(),
        };
        assert_eq!(plan.day_index(date(2025, 1, 1)), Some(1));
        assert_eq!(plan.day_index(date(2025, 1, 15)), Some(15));
        assert_eq!(plan.day_index(date(2024, 12, 31)), None);
    }

    #[test]
    fn item_serde_roundtrip() {
        let item = LearningItem {
            id: "noun:apple".into(),
            text: "apple".into(),
            category: Category::Vocabulary,
            stage: Stage::Elementary,
            tag: "noun".into(),
            weight: 2.0,
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: LearningItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "noun:apple");
        assert_eq!(back.category, Category::Vocabulary);
    }

    #[test]
    fn item_weight_defaults() {
        let json = r#"{
            "id": "verb:run",
            "text": "run",
            "category": "vocabulary",
            "stage": "middle",
            "tag": "verb"
        }"#;
        let item: LearningItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.weight, 5.0);
    }
}
