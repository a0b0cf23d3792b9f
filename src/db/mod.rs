mod catalog;
mod ingredient_repo;
mod override_repo;
mod pattern_repo;
mod recipe_repo;
mod settings_repo;

pub use catalog::{Catalog, CatalogRepository};
pub use ingredient_repo::IngredientRepository;
pub use override_repo::OverrideRepository;
pub use pattern_repo::PatternRepository;
pub use recipe_repo::RecipeRepository;
pub use settings_repo::SettingsRepository;

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use weekplan_core::calendar;
use weekplan_core::MealBlock;

/// Initialize the database connection pool and run migrations
pub async fn init_db(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::debug!(path = %path.display(), "database ready");

    Ok(pool)
}

/// Which table a block set lives in
#[derive(Debug, Clone, Copy)]
pub(crate) enum BlockOwner {
    Pattern,
    Override,
}

impl BlockOwner {
    fn table(self) -> &'static str {
        match self {
            BlockOwner::Pattern => "pattern_blocks",
            BlockOwner::Override => "override_blocks",
        }
    }

    fn key_column(self) -> &'static str {
        match self {
            BlockOwner::Pattern => "pattern_id",
            BlockOwner::Override => "week_start_date",
        }
    }
}

#[derive(sqlx::FromRow)]
struct BlockRow {
    id: String,
    recipe_id: String,
    start_day_index: i64,
    duration_days: i64,
}

impl TryFrom<BlockRow> for MealBlock {
    type Error = sqlx::Error;

    fn try_from(row: BlockRow) -> Result<Self, Self::Error> {
        Ok(MealBlock::new(
            row.id,
            row.recipe_id,
            decode_day(row.start_day_index)?,
            decode_day(row.duration_days)?,
        ))
    }
}

fn decode_day(value: i64) -> Result<u8, sqlx::Error> {
    u8::try_from(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub(crate) fn decode_date(value: &str) -> Result<NaiveDate, sqlx::Error> {
    calendar::from_iso_date(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Load a block set in stored order.
pub(crate) async fn read_blocks(
    conn: &mut SqliteConnection,
    owner: BlockOwner,
    key: &str,
) -> Result<Vec<MealBlock>, sqlx::Error> {
    let sql = format!(
        "SELECT id, recipe_id, start_day_index, duration_days FROM {} WHERE {} = ? ORDER BY position",
        owner.table(),
        owner.key_column()
    );
    let rows: Vec<BlockRow> = sqlx::query_as(&sql).bind(key).fetch_all(&mut *conn).await?;
    rows.into_iter().map(MealBlock::try_from).collect()
}

/// Replace a block set wholesale.
pub(crate) async fn write_blocks(
    conn: &mut SqliteConnection,
    owner: BlockOwner,
    key: &str,
    blocks: &[MealBlock],
) -> Result<(), sqlx::Error> {
    let delete = format!(
        "DELETE FROM {} WHERE {} = ?",
        owner.table(),
        owner.key_column()
    );
    sqlx::query(&delete).bind(key).execute(&mut *conn).await?;

    let insert = format!(
        "INSERT INTO {} ({}, id, position, recipe_id, start_day_index, duration_days) VALUES (?, ?, ?, ?, ?, ?)",
        owner.table(),
        owner.key_column()
    );
    for (position, block) in blocks.iter().enumerate() {
        sqlx::query(&insert)
            .bind(key)
            .bind(&block.id)
            .bind(position as i64)
            .bind(&block.recipe_id)
            .bind(i64::from(block.start_day_index))
            .bind(i64::from(block.duration_days))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
