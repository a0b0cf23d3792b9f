mod config_cmd;
mod data;
mod ingredient;
mod pattern;
mod recipe;
mod settings_cmd;
mod week;

pub use config_cmd::ConfigCommand;
pub use data::DataCommand;
pub use ingredient::IngredientCommand;
pub use pattern::PatternCommand;
pub use recipe::RecipeCommand;
pub use settings_cmd::SettingsCommand;
pub use week::WeekCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use std::io::{self, Write};
use uuid::Uuid;
use weekplan_core::calendar::{self, DAY_NAMES};
use weekplan_core::grid::UNKNOWN_RECIPE;
use weekplan_core::{EditOutcome, MealBlock, Recipe};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Fresh opaque id for a new record
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Ask a yes/no question on stdin; anything but "y" means no.
pub(crate) fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Parse a day as an index (0 = Monday) or a day name or prefix ("mon", "Thursday").
pub(crate) fn parse_day(value: &str) -> Result<u8, String> {
    let value = value.trim();
    if let Ok(index) = value.parse::<u8>() {
        return calendar::day_name(index)
            .map(|_| index)
            .ok_or_else(|| format!("Day index {} is outside the week (0-6)", index));
    }

    let lower = value.to_lowercase();
    if lower.len() >= 2 {
        if let Some(index) = DAY_NAMES
            .iter()
            .position(|name| name.to_lowercase().starts_with(&lower))
        {
            return Ok(index as u8);
        }
    }
    Err(format!(
        "Unknown day '{}'. Use 0-6 or a day name such as 'mon'.",
        value
    ))
}

/// Parse a YYYY-MM-DD date, or "today" / nothing for the current date.
pub(crate) fn parse_date_or_today(value: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match value {
        None => Ok(Local::now().date_naive()),
        Some(s) if s.trim().eq_ignore_ascii_case("today") => Ok(Local::now().date_naive()),
        Some(s) => Ok(calendar::from_iso_date(s)?),
    }
}

/// Day name for a valid index, the raw number otherwise.
pub(crate) fn day_label(day: u8) -> String {
    calendar::day_name(day)
        .map(str::to_string)
        .unwrap_or_else(|| format!("day {}", day))
}

pub(crate) fn recipe_name<'a>(recipes: &'a [Recipe], id: &str) -> &'a str {
    recipes
        .iter()
        .find(|r| r.id == id)
        .map(|r| r.name.as_str())
        .unwrap_or(UNKNOWN_RECIPE)
}

/// "Chili (Monday, Tuesday)"
pub(crate) fn describe_block(block: &MealBlock, recipes: &[Recipe]) -> String {
    let days: Vec<&str> = (0..block.duration_days)
        .filter_map(|offset| calendar::day_name(block.start_day_index.saturating_add(offset)))
        .collect();
    format!("{} ({})", recipe_name(recipes, &block.recipe_id), days.join(", "))
}

/// Turn an engine outcome into the block set to save, if any.
///
/// Rejections become errors. Conflicts are listed and need a "y" unless
/// `force` is set.
pub(crate) fn resolve_outcome(
    outcome: EditOutcome,
    recipes: &[Recipe],
    force: bool,
) -> Result<Option<Vec<MealBlock>>, Box<dyn std::error::Error>> {
    match outcome {
        EditOutcome::Unchanged => {
            println!("Nothing to change.");
            Ok(None)
        }
        EditOutcome::Committed { blocks } => Ok(Some(blocks)),
        EditOutcome::NeedsConfirmation(report) => {
            println!("This change overlaps existing meals:");
            for block in &report.conflicts {
                println!("  {}", describe_block(block, recipes));
            }
            if force || confirm("Replace them?")? {
                Ok(Some(report.confirm()))
            } else {
                println!("Change cancelled.");
                Ok(None)
            }
        }
        EditOutcome::Rejected { reason } => Err(reason.into()),
    }
}

/// Print blocks in day order, one per line.
pub(crate) fn print_blocks(blocks: &[MealBlock], recipes: &[Recipe]) {
    if blocks.is_empty() {
        println!("  (no meals planned)");
        return;
    }
    let mut sorted: Vec<&MealBlock> = blocks.iter().collect();
    sorted.sort_by_key(|b| b.start_day_index);
    for block in sorted {
        println!("  {}", describe_block(block, recipes));
    }
}
