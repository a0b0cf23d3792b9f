use clap::{Args, Subcommand};

use super::{confirm, new_id, OutputFormat};
use weekplan::db::IngredientRepository;
use weekplan_core::Ingredient;

#[derive(Args)]
pub struct IngredientCommand {
    #[command(subcommand)]
    pub command: IngredientSubcommand,
}

#[derive(Subcommand)]
pub enum IngredientSubcommand {
    /// Add a new ingredient
    Add {
        /// Name of the ingredient
        name: String,

        /// Default unit (e.g. "g", "cup", "pc")
        #[arg(long, short)]
        unit: String,
    },

    /// List all ingredients
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update an ingredient's name or default unit
    Update {
        /// Ingredient ID or name
        identifier: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New default unit
        #[arg(long, short)]
        unit: Option<String>,
    },

    /// Delete an ingredient (recipes keep their lines for it)
    Delete {
        /// Ingredient ID or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl IngredientCommand {
    pub async fn run(&self, repo: &IngredientRepository) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            IngredientSubcommand::Add { name, unit } => {
                if name.trim().is_empty() {
                    return Err("Ingredient name cannot be empty".into());
                }
                if unit.trim().is_empty() {
                    return Err("Unit cannot be empty".into());
                }

                let ingredient = Ingredient::new(new_id(), name.trim(), unit.trim());
                repo.upsert(&ingredient).await?;
                println!("Added ingredient: {}", ingredient);
                println!("  id: {}", ingredient.id);
                Ok(())
            }

            IngredientSubcommand::List { format } => {
                let ingredients = repo.list().await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&ingredients)?);
                    }
                    OutputFormat::Text => {
                        if ingredients.is_empty() {
                            println!("No ingredients found");
                            return Ok(());
                        }
                        println!("{:<36}  {:<30}  UNIT", "ID", "NAME");
                        println!("{}", "-".repeat(76));
                        for ingredient in &ingredients {
                            println!(
                                "{:<36}  {:<30}  {}",
                                ingredient.id, ingredient.name, ingredient.unit
                            );
                        }
                        println!("\nTotal: {} ingredient(s)", ingredients.len());
                    }
                }
                Ok(())
            }

            IngredientSubcommand::Update {
                identifier,
                name,
                unit,
            } => {
                if name.is_none() && unit.is_none() {
                    return Err("Nothing to update. Provide --name or --unit.".into());
                }

                let mut ingredient = find_ingredient(repo, identifier).await?;
                if let Some(name) = name {
                    if name.trim().is_empty() {
                        return Err("Ingredient name cannot be empty".into());
                    }
                    ingredient.name = name.trim().to_string();
                }
                if let Some(unit) = unit {
                    if unit.trim().is_empty() {
                        return Err("Unit cannot be empty".into());
                    }
                    ingredient.unit = unit.trim().to_string();
                }

                repo.upsert(&ingredient).await?;
                println!("Updated ingredient: {}", ingredient);
                Ok(())
            }

            IngredientSubcommand::Delete { identifier, force } => {
                let ingredient = find_ingredient(repo, identifier).await?;

                if !force && !confirm(&format!("Delete ingredient '{}'?", ingredient.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                repo.delete(&ingredient.id).await?;
                println!("Deleted ingredient: {}", ingredient.name);
                Ok(())
            }
        }
    }
}

/// Look up an ingredient by id, then by name
pub(crate) async fn find_ingredient(
    repo: &IngredientRepository,
    identifier: &str,
) -> Result<Ingredient, Box<dyn std::error::Error>> {
    if let Some(ingredient) = repo.get(identifier).await? {
        return Ok(ingredient);
    }
    repo.get_by_name(identifier)
        .await?
        .ok_or_else(|| format!("Ingredient not found: {}", identifier).into())
}
