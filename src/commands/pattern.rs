use clap::{Args, Subcommand, ValueEnum};
use sqlx::SqlitePool;

use super::recipe::find_recipe;
use super::{confirm, new_id, parse_day, print_blocks, resolve_outcome, OutputFormat};
use weekplan::db::{PatternRepository, RecipeRepository, SettingsRepository};
use weekplan::server::LAST_PATTERN_MESSAGE;
use weekplan_core::placement::{self, max_duration_at};
use weekplan_core::{next_pattern_name, MealBlock, MoveDirection, Pattern};

#[derive(Args)]
pub struct PatternCommand {
    #[command(subcommand)]
    pub command: PatternSubcommand,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

#[derive(Subcommand)]
pub enum PatternSubcommand {
    /// Create a pattern and append it to the rotation
    Create {
        /// Name (defaults to the next free "Week A".."Week Z")
        name: Option<String>,
    },

    /// List patterns in rotation order
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a pattern's meals
    Show {
        /// Pattern ID or name
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Rename a pattern
    Rename {
        /// Pattern ID or name
        identifier: String,

        /// New name
        name: String,
    },

    /// Delete a pattern (at least one must remain)
    Delete {
        /// Pattern ID or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Move a pattern earlier or later in the rotation
    Move {
        /// Pattern ID or name
        identifier: String,

        #[arg(value_enum)]
        direction: Direction,
    },

    /// Cook a recipe on a day, eaten as leftovers for the following days
    Place {
        /// Pattern ID or name
        identifier: String,

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
    },

    /// Remove the meal covering a day
    RemoveBlock {
        /// Pattern ID or name
        identifier: String,

        /// Any day the meal covers
        #[arg(long, short, value_parser = parse_day)]
        day: u8,
    },

    /// Change how many days the meal covering a day lasts
    Resize {
        /// Pattern ID or name
        identifier: String,

        /// Any day the meal covers
        #[arg(long, short, value_parser = parse_day)]
        day: u8,

        /// New number of days (clamped to the free days that follow)
        #[arg(long)]
        days: u8,
    },
}

impl PatternCommand {
    pub async fn run(&self, pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
        let repo = PatternRepository::new(pool.clone());
        let settings_repo = SettingsRepository::new(pool.clone());
        let recipe_repo = RecipeRepository::new(pool.clone());

        match &self.command {
            PatternSubcommand::Create { name } => {
                let name = match name {
                    Some(name) if name.trim().is_empty() => {
                        return Err("Pattern name cannot be empty".into());
                    }
                    Some(name) => name.trim().to_string(),
                    None => next_pattern_name(&repo.list().await?),
                };

                let pattern = Pattern::new(new_id(), name);
                repo.upsert(&pattern).await?;

                let mut settings = settings_repo.get().await?;
                settings.append_pattern(&pattern.id);
                settings_repo.save(&settings).await?;

                println!("Created pattern: {}", pattern.name);
                println!("  id: {}", pattern.id);
                println!("  rotation position: {}", settings.pattern_order.len());
                Ok(())
            }

            PatternSubcommand::List { format } => {
                let patterns = ordered_patterns(&repo, &settings_repo).await?;

                match format {
                    OutputFormat::Json => {
                        let patterns: Vec<&Pattern> = patterns.iter().map(|(_, p)| p).collect();
                        println!("{}", serde_json::to_string_pretty(&patterns)?);
                    }
                    OutputFormat::Text => {
                        if patterns.is_empty() {
                            println!("No patterns found");
                            return Ok(());
                        }
                        println!("{:<4}  {:<36}  {:<20}  MEALS", "#", "ID", "NAME");
                        println!("{}", "-".repeat(72));
                        for (position, pattern) in &patterns {
                            let position = position
                                .map(|p| (p + 1).to_string())
                                .unwrap_or_else(|| "-".to_string());
                            println!(
                                "{:<4}  {:<36}  {:<20}  {}",
                                position,
                                pattern.id,
                                pattern.name,
                                pattern.meal_blocks.len()
                            );
                        }
                        println!("\nTotal: {} pattern(s)", patterns.len());
                    }
                }
                Ok(())
            }

            PatternSubcommand::Show { identifier, format } => {
                let pattern = find_pattern(&repo, identifier).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&pattern)?);
                    }
                    OutputFormat::Text => {
                        let recipes = recipe_repo.list().await?;
                        println!("{}", pattern.name);
                        println!("{}", "=".repeat(pattern.name.chars().count()));
                        println!("ID: {}", pattern.id);
                        println!("\nMeals:");
                        print_blocks(&pattern.meal_blocks, &recipes);
                    }
                }
                Ok(())
            }

            PatternSubcommand::Rename { identifier, name } => {
                if name.trim().is_empty() {
                    return Err("Pattern name cannot be empty".into());
                }

                let mut pattern = find_pattern(&repo, identifier).await?;
                let old_name = std::mem::replace(&mut pattern.name, name.trim().to_string());
                repo.upsert(&pattern).await?;
                println!("Renamed pattern: {} -> {}", old_name, pattern.name);
                Ok(())
            }

            PatternSubcommand::Delete { identifier, force } => {
                let pattern = find_pattern(&repo, identifier).await?;

                if repo.count().await? <= 1 {
                    return Err(LAST_PATTERN_MESSAGE.into());
                }

                if !force && !confirm(&format!("Delete pattern '{}'?", pattern.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                repo.delete(&pattern.id).await?;
                println!("Deleted pattern: {}", pattern.name);
                Ok(())
            }

            PatternSubcommand::Move {
                identifier,
                direction,
            } => {
                let pattern = find_pattern(&repo, identifier).await?;
                let mut settings = settings_repo.get().await?;

                if !settings.move_pattern(&pattern.id, (*direction).into()) {
                    println!("Nothing to change.");
                    return Ok(());
                }
                settings_repo.save(&settings).await?;

                let position = settings
                    .pattern_order
                    .iter()
                    .position(|id| *id == pattern.id)
                    .map(|p| p + 1)
                    .unwrap_or_default();
                println!("Moved '{}' to rotation position {}", pattern.name, position);
                Ok(())
            }

            PatternSubcommand::Place {
                identifier,
                day,
                recipe,
                days,
                force,
            } => {
                let mut pattern = find_pattern(&repo, identifier).await?;
                let recipe = find_recipe(&recipe_repo, recipe).await?;
                if *days > max_duration_at(*day) {
                    return Err(format!(
                        "A meal cooked on day {} can last at most {} day(s)",
                        day,
                        max_duration_at(*day)
                    )
                    .into());
                }

                let recipes = recipe_repo.list().await?;
                let block = MealBlock::new(new_id(), &recipe.id, *day, *days);
                let outcome = placement::place_block(&pattern.meal_blocks, block);

                if let Some(blocks) = resolve_outcome(outcome, &recipes, *force)? {
                    pattern.meal_blocks = blocks;
                    repo.upsert(&pattern).await?;
                    println!("Updated pattern: {}", pattern.name);
                    print_blocks(&pattern.meal_blocks, &recipes);
                }
                Ok(())
            }

            PatternSubcommand::RemoveBlock { identifier, day } => {
                let mut pattern = find_pattern(&repo, identifier).await?;
                let block_id = block_on_day(&pattern.meal_blocks, *day)?;
                let recipes = recipe_repo.list().await?;
                let outcome = placement::remove_block(&pattern.meal_blocks, &block_id);

                if let Some(blocks) = resolve_outcome(outcome, &recipes, false)? {
                    pattern.meal_blocks = blocks;
                    repo.upsert(&pattern).await?;
                    println!("Updated pattern: {}", pattern.name);
                    print_blocks(&pattern.meal_blocks, &recipes);
                }
                Ok(())
            }

            PatternSubcommand::Resize {
                identifier,
                day,
                days,
            } => {
                let mut pattern = find_pattern(&repo, identifier).await?;
                let block_id = block_on_day(&pattern.meal_blocks, *day)?;
                let recipes = recipe_repo.list().await?;
                let outcome = placement::change_duration(&pattern.meal_blocks, &block_id, *days);

                if let Some(blocks) = resolve_outcome(outcome, &recipes, false)? {
                    pattern.meal_blocks = blocks;
                    repo.upsert(&pattern).await?;
                    println!("Updated pattern: {}", pattern.name);
                    print_blocks(&pattern.meal_blocks, &recipes);
                }
                Ok(())
            }
        }
    }
}

/// Patterns in rotation order with their 0-based position, then any outside the rotation.
async fn ordered_patterns(
    repo: &PatternRepository,
    settings_repo: &SettingsRepository,
) -> Result<Vec<(Option<usize>, Pattern)>, sqlx::Error> {
    let settings = settings_repo.get().await?;
    let mut patterns = repo.list().await?;

    let mut ordered = Vec::with_capacity(patterns.len());
    for (position, id) in settings.pattern_order.iter().enumerate() {
        if let Some(index) = patterns.iter().position(|p| p.id == *id) {
            ordered.push((Some(position), patterns.remove(index)));
        }
    }
    ordered.extend(patterns.into_iter().map(|p| (None, p)));
    Ok(ordered)
}

/// Id of the block that covers `day`, cook day or leftover day.
pub(crate) fn block_on_day(blocks: &[MealBlock], day: u8) -> Result<String, Box<dyn std::error::Error>> {
    placement::expand(blocks)
        .remove(&day)
        .map(|entry| entry.block_id)
        .ok_or_else(|| format!("No meal is planned on {}", super::day_label(day)).into())
}

/// Look up a pattern by id, then by name
pub(crate) async fn find_pattern(
    repo: &PatternRepository,
    identifier: &str,
) -> Result<Pattern, Box<dyn std::error::Error>> {
    if let Some(pattern) = repo.get(identifier).await? {
        return Ok(pattern);
    }
    repo.get_by_name(identifier)
        .await?
        .ok_or_else(|| format!("Pattern not found: {}", identifier).into())
}
