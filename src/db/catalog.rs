use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use weekplan_core::{
    resolver, shopping, ActiveWeek, DataExport, Ingredient, Pattern, Recipe, Settings,
    ShoppingItem, WeekOverride,
};

use super::ingredient_repo::write_ingredient;
use super::override_repo::{read_overrides, write_override};
use super::pattern_repo::write_pattern;
use super::recipe_repo::write_recipe;
use super::settings_repo::{read_settings, write_settings};
use super::{IngredientRepository, PatternRepository, RecipeRepository};

/// Every collection the engine reads, loaded at once
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub ingredients: Vec<Ingredient>,
    pub recipes: Vec<Recipe>,
    pub patterns: Vec<Pattern>,
    pub settings: Settings,
    pub week_overrides: Vec<WeekOverride>,
}

impl Catalog {
    pub fn active_week(&self, date: NaiveDate) -> ActiveWeek {
        resolver::active_week(date, &self.settings, &self.patterns, &self.week_overrides)
    }

    /// Shopping list for one week's blocks
    pub fn shopping_list(&self, date: NaiveDate) -> Vec<ShoppingItem> {
        let week = self.active_week(date);
        shopping::aggregate(&week.blocks, &self.recipes, &self.ingredients)
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn pattern(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn into_export(self) -> DataExport {
        DataExport::new(
            self.ingredients,
            self.recipes,
            self.patterns,
            self.settings,
            self.week_overrides,
        )
    }
}

pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load(&self) -> Result<Catalog, sqlx::Error> {
        let ingredients = IngredientRepository::new(self.pool.clone()).list().await?;
        let recipes = RecipeRepository::new(self.pool.clone()).list().await?;
        let patterns = PatternRepository::new(self.pool.clone()).list().await?;

        let mut conn = self.pool.acquire().await?;
        let settings = read_settings(&mut conn).await?;
        let week_overrides = read_overrides(&mut conn).await?;

        Ok(Catalog {
            ingredients,
            recipes,
            patterns,
            settings,
            week_overrides,
        })
    }

    /// Replace every table with the contents of `data` in one transaction.
    /// Callers validate the document first.
    pub async fn replace_all(&self, data: &DataExport) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        clear_all(&mut tx).await?;

        for ingredient in &data.ingredients {
            write_ingredient(&mut tx, ingredient).await?;
        }
        for recipe in &data.recipes {
            write_recipe(&mut tx, recipe).await?;
        }
        for pattern in &data.patterns {
            write_pattern(&mut tx, pattern).await?;
        }
        for week in &data.week_overrides {
            write_override(&mut tx, week).await?;
        }
        write_settings(&mut tx, &data.settings).await?;

        tx.commit().await?;
        tracing::info!(
            ingredients = data.ingredients.len(),
            recipes = data.recipes.len(),
            patterns = data.patterns.len(),
            week_overrides = data.week_overrides.len(),
            "all data replaced"
        );
        Ok(())
    }
}

async fn clear_all(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    // Child tables cascade from their parents
    for table in [
        "ingredients",
        "recipes",
        "patterns",
        "week_overrides",
        "pattern_order",
        "settings",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
