use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::Row;

use fieldquote_core::domain::inventory::InventorySnapshot;

use super::{decode_decimal, InventoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlInventoryRepository {
    pool: DbPool,
}

impl SqlInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InventoryRepository for SqlInventoryRepository {
    async fn get_stock(&self, item_name: &str) -> Result<Decimal, RepositoryError> {
        let row = sqlx::query("SELECT stock_quantity FROM inventory WHERE item_name = ?")
            .bind(item_name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: String = row
                    .try_get("stock_quantity")
                    .map_err(|e| RepositoryError::Decode(e.to_string()))?;
                decode_decimal("stock_quantity", &raw)
            }
            None => Ok(Decimal::ZERO),
        }
    }

    async fn set_stock(&self, item_name: &str, quantity: Decimal) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO inventory (item_name, stock_quantity, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(item_name) DO UPDATE SET
                 stock_quantity = excluded.stock_quantity,
                 updated_at = excluded.updated_at",
        )
        .bind(item_name)
        .bind(quantity.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn snapshot(&self) -> Result<InventorySnapshot, RepositoryError> {
        let rows = sqlx::query("SELECT item_name, stock_quantity FROM inventory")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let item_name: String =
                    row.try_get("item_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let raw: String = row
                    .try_get("stock_quantity")
                    .map_err(|e| RepositoryError::Decode(e.to_string()))?;
                Ok((item_name, decode_decimal("stock_quantity", &raw)?))
            })
            .collect()
    }
}
