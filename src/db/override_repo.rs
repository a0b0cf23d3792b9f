use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use weekplan_core::calendar;
use weekplan_core::WeekOverride;

use super::{decode_date, read_blocks, write_blocks, BlockOwner};

/// Week overrides, keyed by the Monday of their week
pub struct OverrideRepository {
    pool: SqlitePool,
}

impl OverrideRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<WeekOverride>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        read_overrides(&mut conn).await
    }

    /// The override for the week containing `date`, if the week was customized
    pub async fn get(&self, date: NaiveDate) -> Result<Option<WeekOverride>, sqlx::Error> {
        let week = calendar::to_iso_date(calendar::week_start(date));
        let mut conn = self.pool.acquire().await?;

        let exists: Option<(String,)> =
            sqlx::query_as("SELECT week_start_date FROM week_overrides WHERE week_start_date = ?")
                .bind(&week)
                .fetch_optional(&mut *conn)
                .await?;

        match exists {
            Some((week,)) => {
                let blocks = read_blocks(&mut conn, BlockOwner::Override, &week).await?;
                Ok(Some(WeekOverride::new(decode_date(&week)?, blocks)))
            }
            None => Ok(None),
        }
    }

    /// Create or replace the override for its week
    pub async fn upsert(&self, week: &WeekOverride) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        write_override(&mut tx, week).await?;
        tx.commit().await?;
        tracing::debug!(
            week = %week.week_start_date,
            blocks = week.meal_blocks.len(),
            "week override saved"
        );
        Ok(())
    }

    /// Reset a week to its pattern
    pub async fn delete(&self, date: NaiveDate) -> Result<bool, sqlx::Error> {
        let week = calendar::to_iso_date(calendar::week_start(date));
        let result = sqlx::query("DELETE FROM week_overrides WHERE week_start_date = ?")
            .bind(&week)
            .execute(&self.pool)
            .await?;
        tracing::debug!(week = %week, deleted = result.rows_affected(), "week override deleted");
        Ok(result.rows_affected() > 0)
    }
}

pub(crate) async fn read_overrides(
    conn: &mut SqliteConnection,
) -> Result<Vec<WeekOverride>, sqlx::Error> {
    let weeks: Vec<(String,)> =
        sqlx::query_as("SELECT week_start_date FROM week_overrides ORDER BY week_start_date")
            .fetch_all(&mut *conn)
            .await?;

    let mut overrides = Vec::with_capacity(weeks.len());
    for (week,) in weeks {
        let blocks = read_blocks(conn, BlockOwner::Override, &week).await?;
        overrides.push(WeekOverride::new(decode_date(&week)?, blocks));
    }
    Ok(overrides)
}

pub(crate) async fn write_override(
    conn: &mut SqliteConnection,
    week: &WeekOverride,
) -> Result<(), sqlx::Error> {
    let key = calendar::to_iso_date(calendar::week_start(week.week_start_date));
    sqlx::query("INSERT OR IGNORE INTO week_overrides (week_start_date) VALUES (?)")
        .bind(&key)
        .execute(&mut *conn)
        .await?;

    write_blocks(conn, BlockOwner::Override, &key, &week.meal_blocks).await
}
