use clap::{Args, Subcommand};
use sqlx::SqlitePool;

use super::{parse_date_or_today, OutputFormat};
use weekplan::db::{PatternRepository, SettingsRepository};
use weekplan_core::calendar;
use weekplan_core::resolver::resolve_pattern_id;
use weekplan_core::{pattern_by_id, Pattern};

#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show the rotation start date and pattern order
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set the week that uses the first pattern (moved back to its Monday)
    SetStart {
        /// Any date in that week (YYYY-MM-DD or "today")
        date: String,
    },
}

impl SettingsCommand {
    pub async fn run(&self, pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
        let repo = SettingsRepository::new(pool.clone());

        match &self.command {
            SettingsSubcommand::Show { format } => {
                let settings = repo.get().await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&settings)?);
                    }
                    OutputFormat::Text => {
                        let patterns = PatternRepository::new(pool.clone()).list().await?;

                        match settings.pattern_start_date {
                            Some(start) => println!(
                                "Rotation starts: {} (week of {})",
                                calendar::to_iso_date(start),
                                calendar::format_week_range(start)
                            ),
                            None => println!("Rotation starts: (not set)"),
                        }

                        println!("\nPattern order:");
                        if settings.pattern_order.is_empty() {
                            println!("  (empty)");
                        }
                        for (position, id) in settings.pattern_order.iter().enumerate() {
                            println!("  {}. {}", position + 1, pattern_label(&patterns, id));
                        }

                        let today = parse_date_or_today(None)?;
                        if let Some(id) = resolve_pattern_id(today, &settings) {
                            println!("\nThis week: {}", pattern_label(&patterns, id));
                        }
                    }
                }
                Ok(())
            }

            SettingsSubcommand::SetStart { date } => {
                let date = parse_date_or_today(Some(date))?;
                let start = calendar::week_start(date);

                let mut settings = repo.get().await?;
                settings.pattern_start_date = Some(start);
                repo.save(&settings).await?;

                println!("Rotation now starts on {}", calendar::to_iso_date(start));
                Ok(())
            }
        }
    }
}

fn pattern_label(patterns: &[Pattern], id: &str) -> String {
    match pattern_by_id(patterns, Some(id)) {
        Some(pattern) => pattern.name.clone(),
        None => format!("{} (missing)", id),
    }
}
