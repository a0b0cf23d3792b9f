//! Shopping list aggregation over a set of placed blocks.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Ingredient, MealBlock, Recipe, ShoppingItem};

pub const UNKNOWN_INGREDIENT: &str = "Unknown ingredient";

/// Sum the ingredient quantities needed to cook every block once.
///
/// Lines are grouped by lower-cased ingredient name and unit, so distinct
/// ingredient records sharing a name merge. Quantities add up without unit
/// conversion. Blocks whose recipe is missing contribute nothing, and lines
/// whose ingredient is missing are listed under "Unknown ingredient".
///
/// When several ingredient records merge into one line, the line takes the id
/// and spelling of the record with the smallest id. Each line's quantities are
/// summed in ascending order, so block order never changes the result.
pub fn aggregate(
    blocks: &[MealBlock],
    recipes: &[Recipe],
    ingredients: &[Ingredient],
) -> Vec<ShoppingItem> {
    let recipes: HashMap<&str, &Recipe> = recipes.iter().map(|r| (r.id.as_str(), r)).collect();
    let ingredients: HashMap<&str, &Ingredient> =
        ingredients.iter().map(|i| (i.id.as_str(), i)).collect();

    let mut items: Vec<ShoppingItem> = Vec::new();
    let mut quantities: Vec<Vec<f64>> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for block in blocks {
        let Some(recipe) = recipes.get(block.recipe_id.as_str()) else {
            tracing::debug!(recipe_id = %block.recipe_id, "skipping block with unknown recipe");
            continue;
        };

        for line in &recipe.ingredients {
            let name = ingredients
                .get(line.ingredient_id.as_str())
                .map(|i| i.name.as_str())
                .unwrap_or(UNKNOWN_INGREDIENT);
            let key = (name.to_lowercase(), line.unit.clone());

            match index.get(&key) {
                Some(&pos) => {
                    let item = &mut items[pos];
                    quantities[pos].push(line.quantity);
                    if line.ingredient_id < item.ingredient_id {
                        item.ingredient_id = line.ingredient_id.clone();
                        item.name = name.to_string();
                    }
                }
                None => {
                    index.insert(key, items.len());
                    quantities.push(vec![line.quantity]);
                    items.push(ShoppingItem {
                        ingredient_id: line.ingredient_id.clone(),
                        name: name.to_string(),
                        unit: line.unit.clone(),
                        quantity: 0.0,
                    });
                }
            }
        }
    }

    for (item, mut parts) in items.iter_mut().zip(quantities) {
        item.quantity = ordered_sum(&mut parts);
    }

    items.sort_by(compare_items);
    items
}

/// Sum in ascending order so the total does not depend on input order.
fn ordered_sum(parts: &mut [f64]) -> f64 {
    parts.sort_by(f64::total_cmp);
    parts.iter().sum()
}

/// Case-insensitive by name, lowercase before uppercase on ties, then by unit.
fn compare_items(a: &ShoppingItem, b: &ShoppingItem) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| b.name.cmp(&a.name))
        .then_with(|| a.unit.cmp(&b.unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeIngredient;

    fn catalog() -> (Vec<Recipe>, Vec<Ingredient>) {
        let ingredients = vec![
            Ingredient::new("i-carrot", "Carrot", "cup"),
            Ingredient::new("i-onion", "onion", "pc"),
            Ingredient::new("i-rice", "Rice", "g"),
        ];
        let recipes = vec![
            Recipe::new("r1", "Soup").with_ingredients(vec![
                RecipeIngredient::new("i-carrot", 1.0, "cup"),
                RecipeIngredient::new("i-onion", 2.0, "pc"),
            ]),
            Recipe::new("r2", "Stew").with_ingredients(vec![
                RecipeIngredient::new("i-carrot", 2.0, "cup"),
                RecipeIngredient::new("i-rice", 200.0, "g"),
            ]),
        ];
        (recipes, ingredients)
    }

    #[test]
    fn test_aggregate_sums_same_name_and_unit() {
        let (recipes, ingredients) = catalog();
        let blocks = vec![
            MealBlock::new("m1", "r1", 0, 2),
            MealBlock::new("m2", "r2", 3, 1),
        ];

        let list = aggregate(&blocks, &recipes, &ingredients);
        let names: Vec<&str> = list.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Carrot", "onion", "Rice"]);
        assert_eq!(list[0].quantity, 3.0);
        assert_eq!(list[0].unit, "cup");
        assert_eq!(list[2].quantity, 200.0);
    }

    #[test]
    fn test_aggregate_counts_each_block_once() {
        // Leftover days do not add ingredients
        let (recipes, ingredients) = catalog();
        let blocks = vec![MealBlock::new("m1", "r1", 0, 4)];
        let list = aggregate(&blocks, &recipes, &ingredients);
        assert_eq!(list[0].quantity, 1.0);
    }

    #[test]
    fn test_aggregate_keeps_units_apart() {
        let ingredients = vec![Ingredient::new("i1", "Milk", "ml")];
        let recipes = vec![Recipe::new("r1", "Pancakes").with_ingredients(vec![
            RecipeIngredient::new("i1", 250.0, "ml"),
            RecipeIngredient::new("i1", 1.0, "cup"),
        ])];
        let list = aggregate(&[MealBlock::new("m1", "r1", 0, 1)], &recipes, &ingredients);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].unit, "cup");
        assert_eq!(list[1].unit, "ml");
    }

    #[test]
    fn test_aggregate_merges_records_sharing_a_name() {
        let ingredients = vec![
            Ingredient::new("i2", "tomato", "pc"),
            Ingredient::new("i1", "Tomato", "pc"),
        ];
        let recipes = vec![Recipe::new("r1", "Salad").with_ingredients(vec![
            RecipeIngredient::new("i2", 1.0, "pc"),
            RecipeIngredient::new("i1", 2.0, "pc"),
        ])];
        let list = aggregate(&[MealBlock::new("m1", "r1", 0, 1)], &recipes, &ingredients);

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].ingredient_id, "i1");
        assert_eq!(list[0].name, "Tomato");
        assert_eq!(list[0].quantity, 3.0);
    }

    #[test]
    fn test_aggregate_tolerates_missing_references() {
        let (recipes, _) = catalog();
        let blocks = vec![
            MealBlock::new("m1", "r1", 0, 1),
            MealBlock::new("m2", "missing", 1, 1),
        ];

        let list = aggregate(&blocks, &recipes, &[]);
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|i| i.name == UNKNOWN_INGREDIENT));
        let total: f64 = list.iter().map(|i| i.quantity).sum();
        assert_eq!(total, 3.0);
    }

    #[test]
    fn test_aggregate_is_independent_of_block_order() {
        let (recipes, ingredients) = catalog();
        let blocks = vec![
            MealBlock::new("m1", "r1", 0, 1),
            MealBlock::new("m2", "r2", 1, 1),
            MealBlock::new("m3", "r1", 2, 1),
        ];
        let mut reversed = blocks.clone();
        reversed.reverse();

        assert_eq!(
            aggregate(&blocks, &recipes, &ingredients),
            aggregate(&reversed, &recipes, &ingredients)
        );
    }

    #[test]
    fn test_aggregate_fractional_totals_independent_of_block_order() {
        let ingredients = vec![Ingredient::new("i1", "Butter", "cup")];
        let recipes: Vec<Recipe> = [("r1", 0.1), ("r2", 0.2), ("r3", 0.3)]
            .into_iter()
            .map(|(id, quantity)| {
                Recipe::new(id, id)
                    .with_ingredients(vec![RecipeIngredient::new("i1", quantity, "cup")])
            })
            .collect();
        let blocks = vec![
            MealBlock::new("m1", "r1", 0, 1),
            MealBlock::new("m2", "r2", 1, 1),
            MealBlock::new("m3", "r3", 2, 1),
        ];
        let mut reversed = blocks.clone();
        reversed.reverse();

        let forward = aggregate(&blocks, &recipes, &ingredients);
        let backward = aggregate(&reversed, &recipes, &ingredients);
        assert_eq!(forward, backward);
        assert_eq!(forward[0].quantity.to_bits(), backward[0].quantity.to_bits());
    }

    #[test]
    fn test_sort_puts_lowercase_first_on_ties() {
        let ingredients = vec![
            Ingredient::new("i1", "Basil", "g"),
            Ingredient::new("i2", "basil", "bunch"),
            Ingredient::new("i3", "apple", "pc"),
        ];
        let recipes = vec![Recipe::new("r1", "Mix").with_ingredients(vec![
            RecipeIngredient::new("i1", 5.0, "g"),
            RecipeIngredient::new("i2", 1.0, "bunch"),
            RecipeIngredient::new("i3", 1.0, "pc"),
        ])];
        let list = aggregate(&[MealBlock::new("m1", "r1", 0, 1)], &recipes, &ingredients);
        let names: Vec<&str> = list.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "basil", "Basil"]);
    }

    #[test]
    fn test_aggregate_empty() {
        let (recipes, ingredients) = catalog();
        assert!(aggregate(&[], &recipes, &ingredients).is_empty());
    }
}
