//! Seven-day view of an active week, ready for display.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar;
use crate::models::{Recipe, DAYS_PER_WEEK};
use crate::placement::expand;
use crate::resolver::ActiveWeek;

pub const UNKNOWN_RECIPE: &str = "Unknown recipe";

/// What is eaten on one occupied day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridMeal {
    pub block_id: String,
    pub recipe_id: String,
    pub recipe_name: String,
    pub is_leftover_day: bool,
    pub day_offset: u8,
    pub duration_days: u8,
}

impl GridMeal {
    /// "Cook day" or "Leftovers (day k of n)"
    pub fn subtitle(&self) -> String {
        if self.is_leftover_day {
            format!(
                "Leftovers (day {} of {})",
                self.day_offset + 1,
                self.duration_days
            )
        } else {
            "Cook day".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDay {
    pub day_index: u8,
    pub day_name: &'static str,
    pub date: NaiveDate,
    pub meal: Option<GridMeal>,
}

/// One entry per day, Monday first, with recipe names resolved.
pub fn week_grid(week: &ActiveWeek, recipes: &[Recipe]) -> Vec<GridDay> {
    let mut days = expand(&week.blocks);

    (0..DAYS_PER_WEEK)
        .map(|day_index| {
            let meal = days.remove(&day_index).map(|entry| {
                let recipe_name = recipes
                    .iter()
                    .find(|r| r.id == entry.recipe_id)
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| UNKNOWN_RECIPE.to_string());
                let duration_days = week
                    .blocks
                    .iter()
                    .find(|b| b.id == entry.block_id)
                    .map(|b| b.duration_days)
                    .unwrap_or(1);
                GridMeal {
                    block_id: entry.block_id,
                    recipe_id: entry.recipe_id,
                    recipe_name,
                    is_leftover_day: entry.is_leftover_day,
                    day_offset: entry.day_offset,
                    duration_days,
                }
            });
            GridDay {
                day_index,
                day_name: calendar::day_name(day_index).unwrap_or("?"),
                date: calendar::add_days(week.week_start, i64::from(day_index)),
                meal,
            }
        })
        .collect()
}
