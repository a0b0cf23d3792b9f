use sqlx::{SqliteConnection, SqlitePool};
use weekplan_core::calendar;
use weekplan_core::Settings;

use super::decode_date;

pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The rotation settings, or the unconfigured default if none were saved
    pub async fn get(&self) -> Result<Settings, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        read_settings(&mut conn).await
    }

    pub async fn save(&self, settings: &Settings) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        write_settings(&mut tx, settings).await?;
        tx.commit().await?;
        tracing::debug!(
            start = ?settings.pattern_start_date,
            patterns = settings.pattern_order.len(),
            "settings saved"
        );
        Ok(())
    }
}

pub(crate) async fn read_settings(conn: &mut SqliteConnection) -> Result<Settings, sqlx::Error> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT pattern_start_date FROM settings WHERE singleton = 1")
            .fetch_optional(&mut *conn)
            .await?;

    let pattern_start_date = match row.and_then(|(date,)| date) {
        Some(date) => Some(decode_date(&date)?),
        None => None,
    };

    let order: Vec<(String,)> =
        sqlx::query_as("SELECT pattern_id FROM pattern_order ORDER BY position")
            .fetch_all(&mut *conn)
            .await?;

    Ok(Settings::new(
        pattern_start_date,
        order.into_iter().map(|(id,)| id).collect(),
    ))
}

pub(crate) async fn write_settings(
    conn: &mut SqliteConnection,
    settings: &Settings,
) -> Result<(), sqlx::Error> {
    let start = settings.pattern_start_date.map(calendar::to_iso_date);
    sqlx::query(
        r#"
        INSERT INTO settings (singleton, pattern_start_date) VALUES (1, ?)
        ON CONFLICT(singleton) DO UPDATE SET pattern_start_date = excluded.pattern_start_date
        "#,
    )
    .bind(start)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM pattern_order")
        .execute(&mut *conn)
        .await?;
    for (position, id) in settings.pattern_order.iter().enumerate() {
        sqlx::query("INSERT INTO pattern_order (position, pattern_id) VALUES (?, ?)")
            .bind(position as i64)
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
