use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::meal_block::MealBlock;

/// A named, reusable arrangement of meal blocks across one week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub meal_blocks: Vec<MealBlock>,
}

impl Pattern {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            meal_blocks: Vec::new(),
        }
    }

    pub fn with_blocks(mut self, meal_blocks: Vec<MealBlock>) -> Self {
        self.meal_blocks = meal_blocks;
        self
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.meal_blocks.len();
        let meals = if count == 1 {
            "1 meal".to_string()
        } else {
            format!("{} meals", count)
        };
        write!(f, "{} ({})", self.name, meals)
    }
}

/// Suggest a name for a new pattern: the first unused "Week A".."Week Z",
/// falling back to "Week <n+1>".
pub fn next_pattern_name(existing: &[Pattern]) -> String {
    let used: HashSet<&str> = existing.iter().map(|p| p.name.trim()).collect();
    ('A'..='Z')
        .map(|letter| format!("Week {}", letter))
        .find(|candidate| !used.contains(candidate.as_str()))
        .unwrap_or_else(|| format!("Week {}", existing.len() + 1))
}

/// Look up a pattern by id; `None` for a missing id or an absent pattern.
pub fn pattern_by_id<'a>(patterns: &'a [Pattern], id: Option<&str>) -> Option<&'a Pattern> {
    let id = id?;
    patterns.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_pattern_name_first_free_letter() {
        let existing = vec![Pattern::new("p1", "Week A"), Pattern::new("p2", " Week C ")];
        assert_eq!(next_pattern_name(&existing), "Week B");
        assert_eq!(next_pattern_name(&[]), "Week A");
    }

    #[test]
    fn test_next_pattern_name_falls_back_to_number() {
        let existing: Vec<Pattern> = ('A'..='Z')
            .enumerate()
            .map(|(i, c)| Pattern::new(format!("p{}", i), format!("Week {}", c)))
            .collect();
        assert_eq!(next_pattern_name(&existing), "Week 27");
    }

    #[test]
    fn test_pattern_by_id() {
        let patterns = vec![Pattern::new("p1", "Week A"), Pattern::new("p2", "Week B")];

        assert_eq!(pattern_by_id(&patterns, Some("p2")).unwrap().name, "Week B");
        assert!(pattern_by_id(&patterns, Some("p9")).is_none());
        assert!(pattern_by_id(&patterns, None).is_none());
    }

    #[test]
    fn test_pattern_display() {
        let pattern = Pattern::new("p1", "Week A")
            .with_blocks(vec![MealBlock::new("m1", "r1", 0, 2)]);
        assert_eq!(pattern.to_string(), "Week A (1 meal)");
    }

    #[test]
    fn test_pattern_json_uses_meal_blocks_key() {
        let json = r#"{"id":"p1","name":"Week A","mealBlocks":[
            {"id":"m1","recipeId":"r1","startDayIndex":4,"durationDays":2}
        ]}"#;
        let pattern: Pattern = serde_json::from_str(json).unwrap();
        assert_eq!(pattern.meal_blocks[0], MealBlock::new("m1", "r1", 4, 2));
    }
}
