use clap::{Args, Subcommand};

use super::ingredient::find_ingredient;
use super::{confirm, new_id, OutputFormat};
use weekplan::db::{IngredientRepository, RecipeRepository};
use weekplan_core::shopping::UNKNOWN_INGREDIENT;
use weekplan_core::{format_quantity, Recipe, RecipeIngredient};

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// Create a new recipe
    Create {
        /// Name of the recipe
        name: String,

        /// Preparation step (can be repeated, kept in order)
        #[arg(long = "step", value_name = "STEP")]
        steps: Vec<String>,
    },

    /// List all recipes
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a recipe's ingredients and steps
    Show {
        /// Recipe ID or name
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a recipe (meals that use it are kept)
    Delete {
        /// Recipe ID or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Add an ingredient line to a recipe
    AddIngredient {
        /// Recipe ID or name
        identifier: String,

        /// Ingredient ID or name
        #[arg(long, short)]
        ingredient: String,

        /// Quantity
        #[arg(long, short)]
        quantity: f64,

        /// Unit (defaults to the ingredient's unit)
        #[arg(long, short)]
        unit: Option<String>,
    },

    /// Remove an ingredient from a recipe
    RemoveIngredient {
        /// Recipe ID or name
        identifier: String,

        /// Ingredient ID or name
        #[arg(long, short)]
        ingredient: String,
    },

    /// Append a preparation step
    AddStep {
        /// Recipe ID or name
        identifier: String,

        /// Step text
        step: String,
    },
}

impl RecipeCommand {
    pub async fn run(
        &self,
        repo: &RecipeRepository,
        ingredient_repo: &IngredientRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            RecipeSubcommand::Create { name, steps } => {
                if name.trim().is_empty() {
                    return Err("Recipe name cannot be empty".into());
                }

                let recipe = Recipe::new(new_id(), name.trim()).with_steps(
                    steps
                        .iter()
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                );
                repo.upsert(&recipe).await?;
                println!("Created recipe:");
                println!("{}", recipe);
                Ok(())
            }

            RecipeSubcommand::List { format } => {
                let recipes = repo.list().await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipes)?);
                    }
                    OutputFormat::Text => {
                        if recipes.is_empty() {
                            println!("No recipes found");
                            return Ok(());
                        }
                        println!("{:<36}  {:<30}  INGREDIENTS", "ID", "NAME");
                        println!("{}", "-".repeat(80));
                        for recipe in &recipes {
                            let name = if recipe.name.chars().count() > 30 {
                                format!("{}...", recipe.name.chars().take(27).collect::<String>())
                            } else {
                                recipe.name.clone()
                            };
                            println!(
                                "{:<36}  {:<30}  {}",
                                recipe.id,
                                name,
                                recipe.ingredients.len()
                            );
                        }
                        println!("\nTotal: {} recipe(s)", recipes.len());
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Show { identifier, format } => {
                let recipe = find_recipe(repo, identifier).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipe)?);
                    }
                    OutputFormat::Text => {
                        let ingredients = ingredient_repo.list().await?;
                        println!("{}", recipe.name);
                        println!("{}", "=".repeat(recipe.name.chars().count()));
                        println!("ID: {}", recipe.id);

                        if !recipe.ingredients.is_empty() {
                            println!("\nIngredients:");
                            for line in &recipe.ingredients {
                                let name = ingredients
                                    .iter()
                                    .find(|i| i.id == line.ingredient_id)
                                    .map(|i| i.name.as_str())
                                    .unwrap_or(UNKNOWN_INGREDIENT);
                                println!(
                                    "  - {} {} {}",
                                    format_quantity(line.quantity),
                                    line.unit,
                                    name
                                );
                            }
                        }

                        if !recipe.steps.is_empty() {
                            println!("\nSteps:");
                            for (i, step) in recipe.steps.iter().enumerate() {
                                println!("  {}. {}", i + 1, step);
                            }
                        }
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Delete { identifier, force } => {
                let recipe = find_recipe(repo, identifier).await?;

                if !force && !confirm(&format!("Delete recipe '{}'?", recipe.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                repo.delete(&recipe.id).await?;
                println!("Deleted recipe: {}", recipe.name);
                Ok(())
            }

            RecipeSubcommand::AddIngredient {
                identifier,
                ingredient,
                quantity,
                unit,
            } => {
                if !quantity.is_finite() || *quantity < 0.0 {
                    return Err("Quantity must be a non-negative number".into());
                }

                let mut recipe = find_recipe(repo, identifier).await?;
                let ingredient = find_ingredient(ingredient_repo, ingredient).await?;
                let unit = unit
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .unwrap_or(&ingredient.unit)
                    .to_string();

                recipe
                    .ingredients
                    .push(RecipeIngredient::new(&ingredient.id, *quantity, &unit));
                repo.upsert(&recipe).await?;

                println!("Added ingredient to '{}':", recipe.name);
                println!("  {} {} {}", format_quantity(*quantity), unit, ingredient.name);
                Ok(())
            }

            RecipeSubcommand::RemoveIngredient {
                identifier,
                ingredient,
            } => {
                let mut recipe = find_recipe(repo, identifier).await?;

                // Fall back to the raw value so lines for deleted ingredients can be removed
                let (ingredient_id, label) = match find_ingredient(ingredient_repo, ingredient).await
                {
                    Ok(found) => (found.id, found.name),
                    Err(_) => (ingredient.clone(), ingredient.clone()),
                };

                if !recipe.remove_ingredient(&ingredient_id) {
                    return Err(format!("'{}' is not in recipe '{}'", label, recipe.name).into());
                }
                repo.upsert(&recipe).await?;
                println!("Removed {} from '{}'", label, recipe.name);
                Ok(())
            }

            RecipeSubcommand::AddStep { identifier, step } => {
                if step.trim().is_empty() {
                    return Err("Step cannot be empty".into());
                }

                let mut recipe = find_recipe(repo, identifier).await?;
                recipe.steps.push(step.trim().to_string());
                repo.upsert(&recipe).await?;
                println!("Added step {} to '{}'", recipe.steps.len(), recipe.name);
                Ok(())
            }
        }
    }
}

/// Look up a recipe by id, then by name
pub(crate) async fn find_recipe(
    repo: &RecipeRepository,
    identifier: &str,
) -> Result<Recipe, Box<dyn std::error::Error>> {
    if let Some(recipe) = repo.get(identifier).await? {
        return Ok(recipe);
    }
    repo.get_by_name(identifier)
        .await?
        .ok_or_else(|| format!("Recipe not found: {}", identifier).into())
}
