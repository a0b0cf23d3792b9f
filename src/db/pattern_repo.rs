use sqlx::{SqliteConnection, SqlitePool};
use weekplan_core::Pattern;

use super::{read_blocks, write_blocks, BlockOwner};

pub struct PatternRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct PatternRow {
    id: String,
    name: String,
}

impl PatternRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Pattern>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let rows: Vec<PatternRow> =
            sqlx::query_as("SELECT id, name FROM patterns ORDER BY name COLLATE NOCASE, id")
                .fetch_all(&mut *conn)
                .await?;

        let mut patterns = Vec::with_capacity(rows.len());
        for row in rows {
            let blocks = read_blocks(&mut conn, BlockOwner::Pattern, &row.id).await?;
            patterns.push(Pattern::new(row.id, row.name).with_blocks(blocks));
        }
        Ok(patterns)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Pattern>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let row: Option<PatternRow> = sqlx::query_as("SELECT id, name FROM patterns WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => {
                let blocks = read_blocks(&mut conn, BlockOwner::Pattern, &row.id).await?;
                Ok(Some(Pattern::new(row.id, row.name).with_blocks(blocks)))
            }
            None => Ok(None),
        }
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Pattern>, sqlx::Error> {
        let id: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM patterns WHERE LOWER(name) = LOWER(?) ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match id {
            Some((id,)) => self.get(&id).await,
            None => Ok(None),
        }
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM patterns")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Create or replace a pattern and its whole block set
    pub async fn upsert(&self, pattern: &Pattern) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        write_pattern(&mut tx, pattern).await?;
        tx.commit().await?;
        tracing::debug!(
            id = %pattern.id,
            blocks = pattern.meal_blocks.len(),
            "pattern saved"
        );
        Ok(())
    }

    /// Delete a pattern, its blocks, and its place in the rotation
    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM patterns WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM pattern_order WHERE pattern_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(id, deleted = result.rows_affected(), "pattern deleted");
        Ok(result.rows_affected() > 0)
    }
}

pub(crate) async fn write_pattern(
    conn: &mut SqliteConnection,
    pattern: &Pattern,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO patterns (id, name) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET name = excluded.name",
    )
    .bind(&pattern.id)
    .bind(&pattern.name)
    .execute(&mut *conn)
    .await?;

    write_blocks(conn, BlockOwner::Pattern, &pattern.id, &pattern.meal_blocks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, SettingsRepository};
    use tempfile::TempDir;
    use weekplan_core::{MealBlock, Settings};

    struct TestContext {
        repo: PatternRepository,
        settings: SettingsRepository,
        _temp_dir: TempDir,
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        TestContext {
            repo: PatternRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool),
            _temp_dir: temp_dir,
        }
    }

    fn week_a() -> Pattern {
        Pattern::new("p1", "Week A").with_blocks(vec![
            MealBlock::new("m2", "r2", 3, 2),
            MealBlock::new("m1", "r1", 0, 3),
        ])
    }

    #[tokio::test]
    async fn test_upsert_and_get_keeps_block_order() {
        let ctx = setup_repo().await;

        ctx.repo.upsert(&week_a()).await.unwrap();
        let fetched = ctx.repo.get("p1").await.unwrap().unwrap();
        assert_eq!(fetched, week_a());
    }

    #[tokio::test]
    async fn test_upsert_replaces_block_set() {
        let ctx = setup_repo().await;

        ctx.repo.upsert(&week_a()).await.unwrap();
        let replaced = week_a().with_blocks(vec![MealBlock::new("m3", "r3", 6, 1)]);
        ctx.repo.upsert(&replaced).await.unwrap();

        let fetched = ctx.repo.get("p1").await.unwrap().unwrap();
        assert_eq!(fetched.meal_blocks, vec![MealBlock::new("m3", "r3", 6, 1)]);
    }

    #[tokio::test]
    async fn test_list_get_by_name_and_count() {
        let ctx = setup_repo().await;

        ctx.repo.upsert(&Pattern::new("p2", "Week B")).await.unwrap();
        ctx.repo.upsert(&week_a()).await.unwrap();

        let names: Vec<String> = ctx
            .repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Week A", "Week B"]);
        assert_eq!(ctx.repo.count().await.unwrap(), 2);

        let found = ctx.repo.get_by_name("week a").await.unwrap().unwrap();
        assert_eq!(found.meal_blocks.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_blocks_and_rotation_entry() {
        let ctx = setup_repo().await;

        ctx.repo.upsert(&week_a()).await.unwrap();
        ctx.repo.upsert(&Pattern::new("p2", "Week B")).await.unwrap();
        ctx.settings
            .save(&Settings::new(None, vec!["p1".into(), "p2".into()]))
            .await
            .unwrap();

        assert!(ctx.repo.delete("p1").await.unwrap());
        assert!(ctx.repo.get("p1").await.unwrap().is_none());

        let settings = ctx.settings.get().await.unwrap();
        assert_eq!(settings.pattern_order, vec!["p2"]);

        let (blocks,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pattern_blocks")
            .fetch_one(&ctx.repo.pool)
            .await
            .unwrap();
        assert_eq!(blocks, 0);
    }
}
