use chrono::Utc;
use sqlx::Row;

use fieldquote_core::domain::margin::MarginSet;
use fieldquote_core::domain::settings::GlobalSettings;

use super::{decode_decimal, RepositoryError, SettingsRepository};
use crate::DbPool;

/// Settings live in a single row with `id = 1`.
pub struct SqlSettingsRepository {
    pool: DbPool,
}

impl SqlSettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn column(row: &sqlx::sqlite::SqliteRow, name: &str) -> Result<rust_decimal::Decimal, RepositoryError> {
    let raw: String = row.try_get(name).map_err(|e| RepositoryError::Decode(e.to_string()))?;
    decode_decimal(name, &raw)
}

#[async_trait::async_trait]
impl SettingsRepository for SqlSettingsRepository {
    async fn load(&self) -> Result<GlobalSettings, RepositoryError> {
        let row = sqlx::query(
            "SELECT daily_labor_rate, part_margin, labor_margin, extra_margin
             FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(GlobalSettings::default());
        };

        Ok(GlobalSettings::new(
            column(&row, "daily_labor_rate")?,
            MarginSet::new(
                column(&row, "part_margin")?,
                column(&row, "labor_margin")?,
                column(&row, "extra_margin")?,
            ),
        ))
    }

    async fn save(&self, settings: &GlobalSettings) -> Result<(), RepositoryError> {
        let margins = settings.margins.clamped();

        sqlx::query(
            "INSERT INTO settings (id, daily_labor_rate, part_margin, labor_margin, extra_margin, updated_at)
             VALUES (1, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 daily_labor_rate = excluded.daily_labor_rate,
                 part_margin = excluded.part_margin,
                 labor_margin = excluded.labor_margin,
                 extra_margin = excluded.extra_margin,
                 updated_at = excluded.updated_at",
        )
        .bind(settings.daily_labor_rate.to_string())
        .bind(margins.part_margin.to_string())
        .bind(margins.labor_margin.to_string())
        .bind(margins.extra_margin.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
