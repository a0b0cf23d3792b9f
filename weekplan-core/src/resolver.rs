//! Pattern rotation: which block set applies to a given calendar week.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar;
use crate::models::{pattern_by_id, MealBlock, Pattern, Settings, WeekOverride};

/// Remainder that is never negative, so weeks before the start date cycle
/// backwards through the order. Returns 0 for a zero modulus.
pub fn non_negative_mod(value: i64, modulo: usize) -> usize {
    if modulo == 0 {
        return 0;
    }
    value.rem_euclid(modulo as i64) as usize
}

/// Whole weeks from the pattern start week to the week containing `date`.
pub fn week_index(date: NaiveDate, pattern_start_date: NaiveDate) -> i64 {
    calendar::weeks_between(pattern_start_date, date)
}

/// The pattern id the rotation assigns to the week containing `date`, or
/// `None` when no start date or no pattern order is configured.
pub fn resolve_pattern_id(date: NaiveDate, settings: &Settings) -> Option<&str> {
    if !settings.is_configured() {
        return None;
    }
    let start = settings.pattern_start_date?;
    let index = non_negative_mod(week_index(date, start), settings.pattern_order.len());
    settings.pattern_order.get(index).map(String::as_str)
}

/// Where a week's block set comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "patternId", rename_all = "snake_case")]
pub enum WeekSource {
    /// A one-off override exists for this week
    Override,
    /// The rotation resolved to this pattern
    Pattern(String),
    /// The rotation resolved to an id with no stored pattern
    MissingPattern(String),
    /// No start date or pattern order configured
    Unconfigured,
}

/// The block set in effect for one calendar week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWeek {
    pub week_start: NaiveDate,
    pub source: WeekSource,
    pub blocks: Vec<MealBlock>,
}

impl ActiveWeek {
    pub fn is_override(&self) -> bool {
        self.source == WeekSource::Override
    }

    /// Id of the pattern whose blocks this week shows. `None` when the week is
    /// overridden or no rotation is configured.
    pub fn pattern_id(&self) -> Option<&str> {
        match &self.source {
            WeekSource::Pattern(id) | WeekSource::MissingPattern(id) => Some(id),
            _ => None,
        }
    }
}

/// Resolve the block set for the week containing `date`: an override for
/// that week wins, otherwise the rotation's pattern.
pub fn active_week(
    date: NaiveDate,
    settings: &Settings,
    patterns: &[Pattern],
    overrides: &[WeekOverride],
) -> ActiveWeek {
    let week_start = calendar::week_start(date);

    if let Some(week) = overrides.iter().find(|o| o.week_start_date == week_start) {
        return ActiveWeek {
            week_start,
            source: WeekSource::Override,
            blocks: week.meal_blocks.clone(),
        };
    }

    let Some(pattern_id) = resolve_pattern_id(date, settings) else {
        return ActiveWeek {
            week_start,
            source: WeekSource::Unconfigured,
            blocks: Vec::new(),
        };
    };

    match pattern_by_id(patterns, Some(pattern_id)) {
        Some(pattern) => ActiveWeek {
            week_start,
            source: WeekSource::Pattern(pattern.id.clone()),
            blocks: pattern.meal_blocks.clone(),
        },
        None => ActiveWeek {
            week_start,
            source: WeekSource::MissingPattern(pattern_id.to_string()),
            blocks: Vec::new(),
        },
    }
}
