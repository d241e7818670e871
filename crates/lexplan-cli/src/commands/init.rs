//! The `lexplan init` command.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use uuid::Uuid;

use lexplan_core::model::{Category, CategoryPlan, LearningPlan, Stage};

pub fn execute() -> Result<()> {
    // Create lexplan.toml
    if Path::new("lexplan.toml").exists() {
        println!("lexplan.toml already exists, skipping.");
    } else {
        std::fs::write("lexplan.toml", SAMPLE_CONFIG)?;
        println!("Created lexplan.toml");
    }

    // Create example plan
    std::fs::create_dir_all("plans")?;
    let plan_path = Path::new("plans/example-plan.json");
    if plan_path.exists() {
        println!("plans/example-plan.json already exists, skipping.");
    } else {
        let plan = example_plan();
        std::fs::write(plan_path, serde_json::to_string_pretty(&plan)?)?;
        println!("Created plans/example-plan.json");
    }

    // Create example catalog
    std::fs::create_dir_all("catalog")?;
    let catalog_path = Path::new("catalog/example-catalog.json");
    if catalog_path.exists() {
        println!("catalog/example-catalog.json already exists, skipping.");
    } else {
        std::fs::write(catalog_path, EXAMPLE_CATALOG)?;
        println!("Created catalog/example-catalog.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: lexplan validate --plan plans/example-plan.json --catalog catalog");
    println!("  2. Run: lexplan schedule --plan plans/example-plan.json --catalog catalog");
    println!("  3. Run: lexplan generate --plan plans/example-plan.json --catalog catalog");

    Ok(())
}

fn example_plan() -> LearningPlan {
    let mut vocab_quotas = BTreeMap::new();
    vocab_quotas.insert("noun".to_string(), 0.5);
    vocab_quotas.insert("verb".to_string(), 0.3);
    vocab_quotas.insert("adjective".to_string(), 0.2);

    let mut categories = BTreeMap::new();
    categories.insert(
        Category::Vocabulary,
        CategoryPlan {
            daily_learn_count: 6,
            daily_review_count: 6,
            total_count: 24,
            total_study_cycles: 2,
            stage_mix: BTreeMap::new(),
            tag_quotas: vocab_quotas,
        },
    );
    categories.insert(
        Category::Morphology,
        CategoryPlan {
            daily_learn_count: 2,
            daily_review_count: 2,
            total_count: 8,
            total_study_cycles: 2,
            stage_mix: BTreeMap::new(),
            tag_quotas: BTreeMap::new(),
        },
    );
    categories.insert(
        Category::Syntax,
        CategoryPlan {
            daily_learn_count: 1,
            daily_review_count: 1,
            total_count: 6,
            total_study_cycles: 2,
            stage_mix: BTreeMap::new(),
            tag_quotas: BTreeMap::new(),
        },
    );

    LearningPlan {
        id: Uuid::new_v4(),
        name: "Elementary English starter".into(),
        subject: "english".into(),
        stage: Stage::Elementary,
        start_date: NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date"),
        duration_days: 30,
        seed: 42,
        categories,
    }
}

const SAMPLE_CONFIG: &str = r#"# lexplan configuration

state_dir = "./lexplan-state"
output_dir = "./lexplan-output"
"#;

const EXAMPLE_CATALOG: &str = r#"{
  "items": [
    {"id": "noun:apple", "text": "apple", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 2.0},
    {"id": "noun:book", "text": "book", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 2.0},
    {"id": "noun:chair", "text": "chair", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 3.0},
    {"id": "noun:dog", "text": "dog", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 2.0},
    {"id": "noun:egg", "text": "egg", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 2.0},
    {"id": "noun:fish", "text": "fish", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 3.0},
    {"id": "noun:garden", "text": "garden", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 4.0},
    {"id": "noun:house", "text": "house", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 3.0},
    {"id": "noun:island", "text": "island", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 5.0},
    {"id": "noun:kite", "text": "kite", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 3.0},
    {"id": "noun:lamp", "text": "lamp", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 3.0},
    {"id": "noun:mountain", "text": "mountain", "category": "vocabulary", "stage": "elementary", "tag": "noun", "weight": 5.0},
    {"id": "verb:ask", "text": "ask", "category": "vocabulary", "stage": "elementary", "tag": "verb", "weight": 3.0},
    {"id": "verb:bring", "text": "bring", "category": "vocabulary", "stage": "elementary", "tag": "verb", "weight": 4.0},
    {"id": "verb:catch", "text": "catch", "category": "vocabulary", "stage": "elementary", "tag": "verb", "weight": 4.0},
    {"id": "verb:draw", "text": "draw", "category": "vocabulary", "stage": "elementary", "tag": "verb", "weight": 3.0},
    {"id": "verb:eat", "text": "eat", "category": "vocabulary", "stage": "elementary", "tag": "verb", "weight": 2.0},
    {"id": "verb:find", "text": "find", "category": "vocabulary", "stage": "elementary", "tag": "verb", "weight": 3.0},
    {"id": "verb:give", "text": "give", "category": "vocabulary", "stage": "elementary", "tag": "verb", "weight": 3.0},
    {"id": "verb:hold", "text": "hold", "category": "vocabulary", "stage": "elementary", "tag": "verb", "weight": 4.0},
    {"id": "adjective:angry", "text": "angry", "category": "vocabulary", "stage": "elementary", "tag": "adjective", "weight": 4.0},
    {"id": "adjective:bright", "text": "bright", "category": "vocabulary", "stage": "elementary", "tag": "adjective", "weight": 4.0},
    {"id": "adjective:clever", "text": "clever", "category": "vocabulary", "stage": "elementary", "tag": "adjective", "weight": 5.0},
    {"id": "adjective:deep", "text": "deep", "category": "vocabulary", "stage": "elementary", "tag": "adjective", "weight": 4.0},
    {"id": "morph:plural-nouns", "text": "Plural nouns (-s / -es)", "category": "morphology", "stage": "elementary", "tag": "inflection", "weight": 3.0},
    {"id": "morph:past-tense", "text": "Regular past tense (-ed)", "category": "morphology", "stage": "elementary", "tag": "inflection", "weight": 4.0},
    {"id": "morph:comparative", "text": "Comparative adjectives (-er)", "category": "morphology", "stage": "elementary", "tag": "derivation", "weight": 4.0},
    {"id": "morph:superlative", "text": "Superlative adjectives (-est)", "category": "morphology", "stage": "elementary", "tag": "derivation", "weight": 4.0},
    {"id": "morph:present-participle", "text": "Present participle (-ing)", "category": "morphology", "stage": "elementary", "tag": "inflection", "weight": 3.0},
    {"id": "morph:possessive", "text": "Possessive ('s)", "category": "morphology", "stage": "elementary", "tag": "inflection", "weight": 3.0},
    {"id": "morph:articles", "text": "Articles (a / an / the)", "category": "morphology", "stage": "elementary", "tag": "function-words", "weight": 5.0},
    {"id": "morph:compounds", "text": "Compound words", "category": "morphology", "stage": "elementary", "tag": "derivation", "weight": 5.0},
    {"id": "syntax:simple-sentence", "text": "Subject-verb-object sentences", "category": "syntax", "stage": "elementary", "tag": "clause", "weight": 3.0},
    {"id": "syntax:negation", "text": "Negation with do/does not", "category": "syntax", "stage": "elementary", "tag": "clause", "weight": 4.0},
    {"id": "syntax:yes-no-question", "text": "Yes/no questions", "category": "syntax", "stage": "elementary", "tag": "question", "weight": 4.0},
    {"id": "syntax:imperative", "text": "Imperative sentences", "category": "syntax", "stage": "elementary", "tag": "clause", "weight": 3.0},
    {"id": "syntax:there-be", "text": "There is / there are", "category": "syntax", "stage": "elementary", "tag": "clause", "weight": 4.0},
    {"id": "syntax:conjunction-and", "text": "Joining clauses with and/but", "category": "syntax", "stage": "elementary", "tag": "coordination", "weight": 5.0}
  ]
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use lexplan_core::parser::{check_catalog, validate_plan};

    #[test]
    fn example_plan_is_valid() {
        assert!(validate_plan(&example_plan()).is_ok());
    }

    #[test]
    fn example_catalog_satisfies_example_plan() {
        let file: serde_json::Value = serde_json::from_str(EXAMPLE_CATALOG).unwrap();
        let items: Vec<lexplan_core::model::LearningItem> =
            serde_json::from_value(file["items"].clone()).unwrap();
        let warnings = check_catalog(&example_plan(), &items);
        assert!(warnings.is_empty(), "{warnings:?}");
    }
}
