use sqlx::{SqliteConnection, SqlitePool};
use weekplan_core::{Recipe, RecipeIngredient};

pub struct RecipeRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: String,
    name: String,
}

#[derive(sqlx::FromRow)]
struct RecipeIngredientRow {
    ingredient_id: String,
    quantity: f64,
    unit: String,
}

impl RecipeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Recipe>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let rows: Vec<RecipeRow> =
            sqlx::query_as("SELECT id, name FROM recipes ORDER BY name COLLATE NOCASE, id")
                .fetch_all(&mut *conn)
                .await?;

        let mut recipes = Vec::with_capacity(rows.len());
        for row in rows {
            recipes.push(hydrate_recipe(&mut conn, row).await?);
        }
        Ok(recipes)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Recipe>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let row: Option<RecipeRow> = sqlx::query_as("SELECT id, name FROM recipes WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => hydrate_recipe(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Recipe>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let row: Option<RecipeRow> = sqlx::query_as(
            "SELECT id, name FROM recipes WHERE LOWER(name) = LOWER(?) ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => hydrate_recipe(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Create or replace a recipe together with its ingredient lines and steps
    pub async fn upsert(&self, recipe: &Recipe) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        write_recipe(&mut tx, recipe).await?;
        tx.commit().await?;
        tracing::debug!(id = %recipe.id, "recipe saved");
        Ok(())
    }

    /// Delete a recipe. Meal blocks that reference it are kept.
    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        // CASCADE removes ingredient lines and steps
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::debug!(id, deleted = result.rows_affected(), "recipe deleted");
        Ok(result.rows_affected() > 0)
    }
}

async fn hydrate_recipe(
    conn: &mut SqliteConnection,
    row: RecipeRow,
) -> Result<Recipe, sqlx::Error> {
    let ingredients: Vec<RecipeIngredientRow> = sqlx::query_as(
        "SELECT ingredient_id, quantity, unit FROM recipe_ingredients WHERE recipe_id = ? ORDER BY position",
    )
    .bind(&row.id)
    .fetch_all(&mut *conn)
    .await?;

    let steps: Vec<(String,)> =
        sqlx::query_as("SELECT body FROM recipe_steps WHERE recipe_id = ? ORDER BY position")
            .bind(&row.id)
            .fetch_all(&mut *conn)
            .await?;

    Ok(Recipe::new(row.id, row.name)
        .with_ingredients(
            ingredients
                .into_iter()
                .map(|i| RecipeIngredient::new(i.ingredient_id, i.quantity, i.unit))
                .collect(),
        )
        .with_steps(steps.into_iter().map(|(body,)| body).collect()))
}

pub(crate) async fn write_recipe(
    conn: &mut SqliteConnection,
    recipe: &Recipe,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO recipes (id, name) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET name = excluded.name",
    )
    .bind(&recipe.id)
    .bind(&recipe.name)
    .execute(&mut *conn)
    .await?;

    // Replace ingredient lines
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(&recipe.id)
        .execute(&mut *conn)
        .await?;

    for (position, line) in recipe.ingredients.iter().enumerate() {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, position, ingredient_id, quantity, unit) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&recipe.id)
        .bind(position as i64)
        .bind(&line.ingredient_id)
        .bind(line.quantity)
        .bind(&line.unit)
        .execute(&mut *conn)
        .await?;
    }

    // Replace steps
    sqlx::query("DELETE FROM recipe_steps WHERE recipe_id = ?")
        .bind(&recipe.id)
        .execute(&mut *conn)
        .await?;

    for (position, step) in recipe.steps.iter().enumerate() {
        sqlx::query("INSERT INTO recipe_steps (recipe_id, position, body) VALUES (?, ?, ?)")
            .bind(&recipe.id)
            .bind(position as i64)
            .bind(step)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    struct TestContext {
        repo: RecipeRepository,
        _temp_dir: TempDir,
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        TestContext {
            repo: RecipeRepository::new(pool),
            _temp_dir: temp_dir,
        }
    }

    fn soup() -> Recipe {
        Recipe::new("r1", "Carrot Soup")
            .with_ingredients(vec![
                RecipeIngredient::new("i-carrot", 500.0, "g"),
                RecipeIngredient::new("i-onion", 1.0, "pc"),
            ])
            .with_steps(vec!["Chop".into(), "Simmer".into(), "Blend".into()])
    }

    #[tokio::test]
    async fn test_upsert_and_get_preserves_order() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.upsert(&soup()).await.unwrap();
        let fetched = repo.get("r1").await.unwrap().unwrap();
        assert_eq!(fetched, soup());
    }

    #[tokio::test]
    async fn test_upsert_replaces_child_rows() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.upsert(&soup()).await.unwrap();
        let mut updated = soup();
        updated.name = "Spiced Carrot Soup".into();
        updated.remove_ingredient("i-onion");
        updated.steps = vec!["Roast".into()];
        repo.upsert(&updated).await.unwrap();

        let fetched = repo.get("r1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Spiced Carrot Soup");
        assert_eq!(fetched.ingredients.len(), 1);
        assert_eq!(fetched.steps, vec!["Roast"]);
    }

    #[tokio::test]
    async fn test_list_and_get_by_name() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.upsert(&soup()).await.unwrap();
        repo.upsert(&Recipe::new("r2", "apple pie")).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["apple pie", "Carrot Soup"]);

        let found = repo.get_by_name("CARROT SOUP").await.unwrap().unwrap();
        assert_eq!(found.ingredients.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_children() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.upsert(&soup()).await.unwrap();
        assert!(repo.delete("r1").await.unwrap());
        assert!(repo.get("r1").await.unwrap().is_none());

        let (lines,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipe_ingredients")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(lines, 0);
    }
}
