mod export;
mod ingredient;
pub(crate) mod meal_block;
mod pattern;
mod recipe;
mod settings;
mod shopping_item;
mod week_override;

pub use export::{DataExport, DataExportError, EXPORT_VERSION};
pub use ingredient::{Ingredient, RecipeIngredient};
pub use meal_block::{DayMealEntry, MealBlock, DAYS_PER_WEEK, LAST_DAY_INDEX};
pub use pattern::{next_pattern_name, pattern_by_id, Pattern};
pub use recipe::Recipe;
pub use settings::{MoveDirection, Settings};
pub use shopping_item::{format_quantity, ShoppingItem};
pub use week_override::WeekOverride;
