use serde::{Deserialize, Serialize};

/// Number of day slots in a week grid (Monday = 0 ... Sunday = 6).
pub const DAYS_PER_WEEK: u8 = 7;

/// Index of the last day slot.
pub const LAST_DAY_INDEX: u8 = DAYS_PER_WEEK - 1;

/// One recipe cooked on `start_day_index` and eaten as leftovers on the
/// following `duration_days - 1` days.
///
/// The block occupies the closed range `[start_day_index, start_day_index + duration_days - 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MealBlock {
    pub id: String,
    pub recipe_id: String,
    pub start_day_index: u8,
    pub duration_days: u8,
}

impl MealBlock {
    pub fn new(
        id: impl Into<String>,
        recipe_id: impl Into<String>,
        start_day_index: u8,
        duration_days: u8,
    ) -> Self {
        Self {
            id: id.into(),
            recipe_id: recipe_id.into(),
            start_day_index,
            duration_days,
        }
    }

    /// Last occupied day index (inclusive). May lie past day 6 for an invalid block.
    pub fn end_day_index(&self) -> i32 {
        span_end(self.start_day_index, self.duration_days)
    }

    /// Whether this block's day range intersects `[start, start + duration - 1]`.
    pub fn overlaps_span(&self, start: u8, duration: u8) -> bool {
        spans_overlap(
            self.start_day_index,
            self.duration_days,
            start,
            duration,
        )
    }

    pub fn overlaps(&self, other: &MealBlock) -> bool {
        self.overlaps_span(other.start_day_index, other.duration_days)
    }

    /// Whether the block is at least one day long and lies inside the week.
    pub fn fits_in_week(&self) -> bool {
        span_fits_in_week(self.start_day_index, self.duration_days)
    }

    /// Copy of this block moved to a new start day.
    pub fn moved_to(&self, start_day_index: u8) -> Self {
        Self {
            start_day_index,
            ..self.clone()
        }
    }
}

pub(crate) fn span_end(start: u8, duration: u8) -> i32 {
    i32::from(start) + i32::from(duration) - 1
}

pub(crate) fn spans_overlap(a_start: u8, a_duration: u8, b_start: u8, b_duration: u8) -> bool {
    i32::from(b_start) <= span_end(a_start, a_duration)
        && span_end(b_start, b_duration) >= i32::from(a_start)
}

pub(crate) fn span_fits_in_week(start: u8, duration: u8) -> bool {
    duration >= 1 && start <= LAST_DAY_INDEX && span_end(start, duration) <= i32::from(LAST_DAY_INDEX)
}

/// What occupies a single day of the week grid. Derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayMealEntry {
    pub block_id: String,
    pub recipe_id: String,
    pub is_leftover_day: bool,
    /// 0 = cook day, 1 = first leftover day, ...
    pub day_offset: u8,
}

impl DayMealEntry {
    pub fn is_cook_day(&self) -> bool {
        self.day_offset == 0
    }
}
