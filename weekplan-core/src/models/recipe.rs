use serde::{Deserialize, Serialize};
use std::fmt;

use super::ingredient::RecipeIngredient;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl Recipe {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ingredients: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<RecipeIngredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_steps(mut self, steps: Vec<String>) -> Self {
        self.steps = steps;
        self
    }

    /// Remove every line referencing `ingredient_id`. Returns true if any was removed.
    pub fn remove_ingredient(&mut self, ingredient_id: &str) -> bool {
        let len_before = self.ingredients.len();
        self.ingredients.retain(|i| i.ingredient_id != ingredient_id);
        self.ingredients.len() != len_before
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;

        if !self.steps.is_empty() {
            writeln!(f, "\nSteps:")?;
            for (i, step) in self.steps.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, step)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_builder() {
        let recipe = Recipe::new("r1", "Soup")
            .with_ingredients(vec![RecipeIngredient::new("i1", 2.0, "cup")])
            .with_steps(vec!["Chop".into(), "Simmer".into()]);

        assert_eq!(recipe.ingredients.len(), 1);
        assert_eq!(recipe.steps, vec!["Chop", "Simmer"]);
    }

    #[test]
    fn test_remove_ingredient() {
        let mut recipe = Recipe::new("r1", "Stew").with_ingredients(vec![
            RecipeIngredient::new("i1", 1.0, "cup"),
            RecipeIngredient::new("i2", 3.0, "g"),
            RecipeIngredient::new("i1", 1.0, "tbsp"),
        ]);

        assert!(recipe.remove_ingredient("i1"));
        assert_eq!(recipe.ingredients.len(), 1);
        assert!(!recipe.remove_ingredient("i1"));
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let recipe: Recipe = serde_json::from_str(r#"{"id":"r1","name":"Toast"}"#).unwrap();
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.steps.is_empty());
    }

    #[test]
    fn test_recipe_display_numbers_steps() {
        let recipe = Recipe::new("r1", "Rice").with_steps(vec!["Rinse".into(), "Boil".into()]);
        let output = recipe.to_string();

        assert!(output.contains("Rice"));
        assert!(output.contains("1. Rinse"));
        assert!(output.contains("2. Boil"));
    }
}
