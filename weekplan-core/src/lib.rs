//! WeekPlan Core Library
//!
//! Pure scheduling engine for weekly meal patterns: pattern rotation,
//! block placement, drag-style relocation and shopping list aggregation.
//! Nothing here performs I/O; every edit returns an [`EditOutcome`] that the
//! caller commits to its own store.

pub mod calendar;
pub mod grid;
pub mod models;
pub mod outcome;
pub mod placement;
mod relocation;
pub mod resolver;
pub mod shopping;

pub use calendar::CalendarError;
pub use grid::{week_grid, GridDay, GridMeal};
pub use models::{
    format_quantity, next_pattern_name, pattern_by_id, DataExport, DataExportError,
    DayMealEntry, Ingredient, MealBlock, MoveDirection, Pattern, Recipe, RecipeIngredient,
    Settings, ShoppingItem, WeekOverride, DAYS_PER_WEEK, EXPORT_VERSION,
};
pub use outcome::{ConflictReport, EditOutcome, Rejection};
pub use resolver::{active_week, ActiveWeek, WeekSource};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
