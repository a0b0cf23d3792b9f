use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog ingredient with its default unit.
///
/// Identity is the `id`; two ingredients may share a display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    /// Free-text default unit (e.g. "g", "cup")
    pub unit: String,
}

impl Ingredient {
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.unit)
        }
    }
}

/// A quantity of an ingredient used by one recipe.
///
/// The unit may differ from the ingredient's default unit; no conversion
/// is ever applied between the two.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub ingredient_id: String,
    pub quantity: f64,
    pub unit: String,
}

impl RecipeIngredient {
    pub fn new(ingredient_id: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            ingredient_id: ingredient_id.into(),
            quantity,
            unit: unit.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_display() {
        assert_eq!(Ingredient::new("i1", "Carrot", "g").to_string(), "Carrot (g)");
        assert_eq!(Ingredient::new("i2", "Egg", "").to_string(), "Egg");
    }

    #[test]
    fn test_recipe_ingredient_uses_camel_case_keys() {
        let item = RecipeIngredient::new("i1", 2.5, "cup");
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["ingredientId"], "i1");
        assert_eq!(json["quantity"], 2.5);
        assert_eq!(json["unit"], "cup");
    }
}
