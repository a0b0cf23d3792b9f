use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::meal_block::MealBlock;
use crate::calendar;
use crate::outcome::EditOutcome;
use crate::relocation;

/// A one-off block set replacing the rotation's pattern for a single week.
///
/// At most one override exists per `week_start_date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekOverride {
    /// Monday of the overridden week
    pub week_start_date: NaiveDate,
    #[serde(default)]
    pub meal_blocks: Vec<MealBlock>,
}

impl WeekOverride {
    /// Start an override for the week containing `date` with an explicit block set.
    pub fn new(date: NaiveDate, meal_blocks: Vec<MealBlock>) -> Self {
        Self {
            week_start_date: calendar::week_start(date),
            meal_blocks,
        }
    }

    /// "Customize this week": copy the blocks the week currently resolves to.
    pub fn customize(date: NaiveDate, resolved_blocks: &[MealBlock]) -> Self {
        Self::new(date, resolved_blocks.to_vec())
    }

    /// Replace the block set with a committed result.
    pub fn with_blocks(mut self, meal_blocks: Vec<MealBlock>) -> Self {
        self.meal_blocks = meal_blocks;
        self
    }

    /// Compute the result of dragging the block cooked on `source_day` onto
    /// `target_day`. Never mutates `self`; commit the returned set explicitly.
    pub fn relocate(&self, source_day: u8, target_day: u8) -> EditOutcome {
        relocation::relocate(&self.meal_blocks, source_day, target_day)
    }
}
