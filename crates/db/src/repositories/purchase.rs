use sqlx::Row;

use fieldquote_core::domain::job::PurchaseEntry;
use rust_decimal::Decimal;

use super::{decode_decimal, PurchaseRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPurchaseRepository {
    pool: DbPool,
}

impl SqlPurchaseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PurchaseRepository for SqlPurchaseRepository {
    async fn record(&self, entry: PurchaseEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO purchase_log (id, item_name, quantity, rate, total_cost, purchased_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.0.to_string())
        .bind(&entry.item_name)
        .bind(entry.quantity.to_string())
        .bind(entry.rate.to_string())
        .bind(entry.total_cost.to_string())
        .bind(entry.purchased_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_costs(&self) -> Result<Vec<Decimal>, RepositoryError> {
        let rows = sqlx::query("SELECT total_cost FROM purchase_log ORDER BY purchased_at")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let raw: String =
                    row.try_get("total_cost").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                decode_decimal("total_cost", &raw)
            })
            .collect()
    }
}
