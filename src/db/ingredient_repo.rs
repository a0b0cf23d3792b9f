use sqlx::{SqliteConnection, SqlitePool};
use weekplan_core::Ingredient;

pub struct IngredientRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct IngredientRow {
    id: String,
    name: String,
    unit: String,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Ingredient::new(row.id, row.name, row.unit)
    }
}

impl IngredientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Ingredient>, sqlx::Error> {
        let rows: Vec<IngredientRow> =
            sqlx::query_as("SELECT id, name, unit FROM ingredients ORDER BY name COLLATE NOCASE, id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Ingredient>, sqlx::Error> {
        let row: Option<IngredientRow> =
            sqlx::query_as("SELECT id, name, unit FROM ingredients WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Ingredient::from))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Ingredient>, sqlx::Error> {
        let row: Option<IngredientRow> = sqlx::query_as(
            "SELECT id, name, unit FROM ingredients WHERE LOWER(name) = LOWER(?) ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Ingredient::from))
    }

    /// Create or replace an ingredient
    pub async fn upsert(&self, ingredient: &Ingredient) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        write_ingredient(&mut conn, ingredient).await?;
        tracing::debug!(id = %ingredient.id, "ingredient saved");
        Ok(())
    }

    /// Delete an ingredient. Recipe lines that use it are kept.
    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::debug!(id, deleted = result.rows_affected(), "ingredient deleted");
        Ok(result.rows_affected() > 0)
    }
}

pub(crate) async fn write_ingredient(
    conn: &mut SqliteConnection,
    ingredient: &Ingredient,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO ingredients (id, name, unit) VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET name = excluded.name, unit = excluded.unit
        "#,
    )
    .bind(&ingredient.id)
    .bind(&ingredient.name)
    .bind(&ingredient.unit)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
