use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::{Ingredient, Pattern, Recipe, Settings, WeekOverride};
use crate::calendar;
use crate::outcome::Rejection;
use crate::placement::validate_blocks;

pub const EXPORT_VERSION: u32 = 1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataExportError {
    #[error("Unsupported export version {0} (expected {EXPORT_VERSION})")]
    UnsupportedVersion(u32),

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Invalid meal blocks in {owner}: {reason}")]
    InvalidBlocks { owner: String, reason: Rejection },

    #[error("Week override date {0} is not a Monday")]
    NotWeekStart(String),

    #[error("Pattern order lists {0} more than once")]
    DuplicateOrderEntry(String),
}

/// Everything in the store, as a single portable document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub week_overrides: Vec<WeekOverride>,
}

impl DataExport {
    pub fn new(
        ingredients: Vec<Ingredient>,
        recipes: Vec<Recipe>,
        patterns: Vec<Pattern>,
        settings: Settings,
        week_overrides: Vec<WeekOverride>,
    ) -> Self {
        Self {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            ingredients,
            recipes,
            patterns,
            settings,
            week_overrides,
        }
    }

    /// Check a document before it replaces the store.
    ///
    /// Dangling references (a block naming a deleted recipe, an order entry
    /// naming a deleted pattern) are tolerated, matching how they are rendered.
    pub fn validate(&self) -> Result<(), DataExportError> {
        if self.version != EXPORT_VERSION {
            return Err(DataExportError::UnsupportedVersion(self.version));
        }

        unique_ids("ingredient", self.ingredients.iter().map(|i| i.id.as_str()))?;
        unique_ids("recipe", self.recipes.iter().map(|r| r.id.as_str()))?;
        unique_ids("pattern", self.patterns.iter().map(|p| p.id.as_str()))?;

        for pattern in &self.patterns {
            validate_blocks(&pattern.meal_blocks).map_err(|reason| {
                DataExportError::InvalidBlocks {
                    owner: format!("pattern '{}'", pattern.name),
                    reason,
                }
            })?;
        }

        let mut weeks = HashSet::new();
        for week in &self.week_overrides {
            let date = calendar::to_iso_date(week.week_start_date);
            if !calendar::is_week_start(week.week_start_date) {
                return Err(DataExportError::NotWeekStart(date));
            }
            if !weeks.insert(week.week_start_date) {
                return Err(DataExportError::DuplicateId {
                    kind: "week override",
                    id: date,
                });
            }
            validate_blocks(&week.meal_blocks).map_err(|reason| {
                DataExportError::InvalidBlocks {
                    owner: format!("week of {}", date),
                    reason,
                }
            })?;
        }

        if self.settings.has_duplicate_patterns() {
            let mut seen = HashSet::new();
            if let Some(id) = self
                .settings
                .pattern_order
                .iter()
                .find(|id| !seen.insert(id.as_str()))
            {
                return Err(DataExportError::DuplicateOrderEntry(id.clone()));
            }
        }

        Ok(())
    }
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), DataExportError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DataExportError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealBlock;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> DataExport {
        DataExport::new(
            vec![Ingredient::new("i1", "Carrot", "g")],
            vec![Recipe::new("r1", "Soup")],
            vec![Pattern::new("p1", "Week A").with_blocks(vec![MealBlock::new("m1", "r1", 0, 2)])],
            Settings::new(Some(date(2026, 2, 9)), vec!["p1".into()]),
            vec![WeekOverride::new(
                date(2026, 2, 16),
                vec![MealBlock::new("m2", "r1", 4, 3)],
            )],
        )
    }

    #[test]
    fn test_valid_document() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["version"], 1);
        assert!(json["exportedAt"].is_string());
        assert_eq!(json["settings"]["patternStartDate"], "2026-02-09");
        assert_eq!(json["weekOverrides"][0]["weekStartDate"], "2026-02-16");
        assert_eq!(json["patterns"][0]["mealBlocks"][0]["durationDays"], 2);

        let parsed: DataExport = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.patterns, sample().patterns);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let parsed: DataExport =
            serde_json::from_str(r#"{"version":1,"exportedAt":"2026-02-09T10:00:00Z"}"#).unwrap();
        assert!(parsed.ingredients.is_empty());
        assert_eq!(parsed.settings, Settings::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut doc = sample();
        doc.version = 2;
        assert_eq!(doc.validate(), Err(DataExportError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut doc = sample();
        doc.recipes.push(Recipe::new("r1", "Other"));
        assert!(matches!(
            doc.validate(),
            Err(DataExportError::DuplicateId { kind: "recipe", .. })
        ));
    }

    #[test]
    fn test_rejects_overlapping_pattern_blocks() {
        let mut doc = sample();
        doc.patterns[0]
            .meal_blocks
            .push(MealBlock::new("m3", "r1", 1, 1));
        assert!(matches!(
            doc.validate(),
            Err(DataExportError::InvalidBlocks { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_block_ids_in_override() {
        let mut doc = sample();
        doc.week_overrides[0]
            .meal_blocks
            .push(MealBlock::new("m2", "r1", 0, 1));
        assert!(matches!(
            doc.validate(),
            Err(DataExportError::InvalidBlocks {
                reason: Rejection::DuplicateBlockId { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_block_past_week_end() {
        let mut doc = sample();
        doc.week_overrides[0].meal_blocks = vec![MealBlock::new("m2", "r1", 5, 3)];
        assert!(matches!(
            doc.validate(),
            Err(DataExportError::InvalidBlocks { .. })
        ));
    }

    #[test]
    fn test_rejects_override_not_on_monday() {
        let mut doc = sample();
        doc.week_overrides[0].week_start_date = date(2026, 2, 18);
        assert_eq!(
            doc.validate(),
            Err(DataExportError::NotWeekStart("2026-02-18".into()))
        );
    }

    #[test]
    fn test_rejects_duplicate_order_entry() {
        let mut doc = sample();
        doc.settings.pattern_order.push("p1".into());
        assert_eq!(
            doc.validate(),
            Err(DataExportError::DuplicateOrderEntry("p1".into()))
        );
    }
}
