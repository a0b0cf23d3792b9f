use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use sqlx::SqlitePool;

use super::pattern::block_on_day;
use super::recipe::find_recipe;
use super::{
    confirm, new_id, parse_date_or_today, parse_day, print_blocks, resolve_outcome, OutputFormat,
};
use weekplan::db::{Catalog, CatalogRepository, OverrideRepository, RecipeRepository};
use weekplan_core::placement::{self, max_duration_at};
use weekplan_core::resolver::resolve_pattern_id;
use weekplan_core::{
    calendar, format_quantity, week_grid, EditOutcome, GridDay, MealBlock, WeekOverride,
    WeekSource,
};

#[derive(Args)]
pub struct WeekCommand {
    #[command(subcommand)]
    pub command: WeekSubcommand,
}

#[derive(Subcommand)]
pub enum WeekSubcommand {
    /// Show the meals planned for a week
    Show {
        /// Any date in the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Weeks to shift from that date (e.g. 1 for next week, -1 for last week)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Copy the rotation's pattern into an editable copy for this week only
    Customize {
        /// Any date in the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Drop this week's changes and follow the rotation again
    Reset {
        /// Any date in the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Cook a recipe on a day of this week
    Place {
        /// Cook day (0-6 or a name such as "mon")
        #[arg(long, short, value_parser = parse_day)]
        day: u8,

        /// Recipe ID or name
        #[arg(long, short)]
        recipe: String,

        /// Number of days the meal covers
        #[arg(long, default_value_t = 1)]
        days: u8,

        /// Replace overlapping meals without asking
        #[arg(long, short)]
        force: bool,

        /// Any date in the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Move the meal cooked on one day to another day
    Move {
        /// Cook day of the meal to move
        #[arg(value_parser = parse_day)]
        from: u8,

        /// Day to move it to
        #[arg(value_parser = parse_day)]
        to: u8,

        /// Replace overlapping meals without asking
        #[arg(long, short)]
        force: bool,

        /// Any date in the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Change how many days the meal covering a day lasts
    Resize {
        /// Any day the meal covers
        #[arg(long, short, value_parser = parse_day)]
        day: u8,

        /// New number of days (clamped to the free days that follow)
        #[arg(long)]
        days: u8,

        /// Any date in the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Remove the meal covering a day
    Remove {
        /// Any day the meal covers
        #[arg(long, short, value_parser = parse_day)]
        day: u8,

        /// Any date in the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the shopping list for a week
    Shopping {
        /// Any date in the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeekView<'a> {
    week_start: NaiveDate,
    label: String,
    source: &'a WeekSource,
    pattern_name: Option<&'a str>,
    days: &'a [GridDay],
}

impl WeekCommand {
    pub async fn run(&self, pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
        let catalog_repo = CatalogRepository::new(pool.clone());
        let override_repo = OverrideRepository::new(pool.clone());

        match &self.command {
            WeekSubcommand::Show {
                date,
                offset,
                format,
            } => {
                let date = parse_date_or_today(date.as_deref())?;
                let date = calendar::add_weeks(date, *offset);
                let catalog = catalog_repo.load().await?;

                let week = catalog.active_week(date);
                let days = week_grid(&week, &catalog.recipes);
                let view = WeekView {
                    week_start: week.week_start,
                    label: calendar::format_week_range(week.week_start),
                    source: &week.source,
                    pattern_name: rotation_pattern_name(&catalog, date),
                    days: &days,
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    }
                    OutputFormat::Text => print_week(&view),
                }
                Ok(())
            }

            WeekSubcommand::Customize { date } => {
                let date = parse_date_or_today(date.as_deref())?;
                let catalog = catalog_repo.load().await?;
                let week = catalog.active_week(date);

                if week.is_override() {
                    return Err(format!(
                        "The week of {} is already customized",
                        calendar::format_week_range(week.week_start)
                    )
                    .into());
                }

                let custom = WeekOverride::customize(date, &week.blocks);
                override_repo.upsert(&custom).await?;
                println!(
                    "Customized the week of {} ({} meal(s) copied)",
                    calendar::format_week_range(custom.week_start_date),
                    custom.meal_blocks.len()
                );
                Ok(())
            }

            WeekSubcommand::Reset { date, force } => {
                let date = parse_date_or_today(date.as_deref())?;
                let label = calendar::format_week_range(calendar::week_start(date));

                if override_repo.get(date).await?.is_none() {
                    println!("The week of {} already follows the rotation.", label);
                    return Ok(());
                }

                if !force && !confirm(&format!("Discard changes to the week of {}?", label))? {
                    println!("Reset cancelled.");
                    return Ok(());
                }

                override_repo.delete(date).await?;
                println!("The week of {} follows the rotation again.", label);
                Ok(())
            }

            WeekSubcommand::Place {
                day,
                recipe,
                days,
                force,
                date,
            } => {
                let date = parse_date_or_today(date.as_deref())?;
                let recipe = find_recipe(&RecipeRepository::new(pool.clone()), recipe).await?;
                if *days > max_duration_at(*day) {
                    return Err(format!(
                        "A meal cooked on day {} can last at most {} day(s)",
                        day,
                        max_duration_at(*day)
                    )
                    .into());
                }

                let catalog = catalog_repo.load().await?;
                let week = editable_week(&catalog, date);
                let block = MealBlock::new(new_id(), &recipe.id, *day, *days);
                let outcome = placement::place_block(&week.meal_blocks, block);
                commit(&override_repo, &catalog, week, outcome, *force).await
            }

            WeekSubcommand::Move {
                from,
                to,
                force,
                date,
            } => {
                let date = parse_date_or_today(date.as_deref())?;
                let catalog = catalog_repo.load().await?;
                let week = editable_week(&catalog, date);
                let outcome = week.relocate(*from, *to);
                commit(&override_repo, &catalog, week, outcome, *force).await
            }

            WeekSubcommand::Resize { day, days, date } => {
                let date = parse_date_or_today(date.as_deref())?;
                let catalog = catalog_repo.load().await?;
                let week = editable_week(&catalog, date);
                let block_id = block_on_day(&week.meal_blocks, *day)?;
                let outcome = placement::change_duration(&week.meal_blocks, &block_id, *days);
                commit(&override_repo, &catalog, week, outcome, false).await
            }

            WeekSubcommand::Remove { day, date } => {
                let date = parse_date_or_today(date.as_deref())?;
                let catalog = catalog_repo.load().await?;
                let week = editable_week(&catalog, date);
                let block_id = block_on_day(&week.meal_blocks, *day)?;
                let outcome = placement::remove_block(&week.meal_blocks, &block_id);
                commit(&override_repo, &catalog, week, outcome, false).await
            }

            WeekSubcommand::Shopping { date, format } => {
                let date = parse_date_or_today(date.as_deref())?;
                let catalog = catalog_repo.load().await?;
                let items = catalog.shopping_list(date);

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&items)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "Shopping list for {}",
                            calendar::format_week_range(calendar::week_start(date))
                        );
                        if items.is_empty() {
                            println!("  (nothing to buy)");
                        }
                        for item in &items {
                            println!(
                                "  [ ] {} {} {}",
                                format_quantity(item.quantity),
                                item.unit,
                                item.name
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

/// The stored override for the week, or a fresh copy of what the week resolves to.
fn editable_week(catalog: &Catalog, date: NaiveDate) -> WeekOverride {
    let week_start = calendar::week_start(date);
    catalog
        .week_overrides
        .iter()
        .find(|o| o.week_start_date == week_start)
        .cloned()
        .unwrap_or_else(|| WeekOverride::customize(date, &catalog.active_week(date).blocks))
}

async fn commit(
    repo: &OverrideRepository,
    catalog: &Catalog,
    week: WeekOverride,
    outcome: EditOutcome,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(blocks) = resolve_outcome(outcome, &catalog.recipes, force)? {
        let week = week.with_blocks(blocks);
        repo.upsert(&week).await?;
        println!(
            "Updated the week of {}:",
            calendar::format_week_range(week.week_start_date)
        );
        print_blocks(&week.meal_blocks, &catalog.recipes);
    }
    Ok(())
}

/// Name of the pattern the rotation assigns, even when the week is customized.
fn rotation_pattern_name(catalog: &Catalog, date: NaiveDate) -> Option<&str> {
    resolve_pattern_id(date, &catalog.settings)
        .and_then(|id| catalog.pattern(id))
        .map(|p| p.name.as_str())
}

fn source_label(view: &WeekView<'_>) -> String {
    match (view.source, view.pattern_name) {
        (WeekSource::Override, Some(name)) => format!("customized from {}", name),
        (WeekSource::Override, None) => "customized".to_string(),
        (WeekSource::Pattern(_), Some(name)) => name.to_string(),
        (WeekSource::Pattern(id), None) | (WeekSource::MissingPattern(id), _) => {
            format!("missing pattern {}", id)
        }
        (WeekSource::Unconfigured, _) => "no rotation configured".to_string(),
    }
}

fn print_week(view: &WeekView<'_>) {
    println!("Week of {} ({})", view.label, source_label(view));
    println!("{}", "-".repeat(60));
    for day in view.days {
        let date = calendar::short_label(day.date);
        match &day.meal {
            Some(meal) => println!(
                "{:<10} {:<7} {:<24} {}",
                day.day_name,
                date,
                meal.recipe_name,
                meal.subtitle()
            ),
            None => println!("{:<10} {:<7} -", day.day_name, date),
        }
    }
}
