use chrono::Utc;
use sqlx::Row;

use fieldquote_core::domain::estimate::EstimateRecord;
use fieldquote_core::domain::job::{ClientId, ClientJob};

use super::{EstimateRepository, RepositoryError};
use crate::DbPool;

pub struct SqlEstimateRepository {
    pool: DbPool,
}

impl SqlEstimateRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn encode_estimate(estimate: &EstimateRecord) -> Result<String, RepositoryError> {
    serde_json::to_string(estimate).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<ClientJob, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let estimate_json: Option<String> =
        row.try_get("internal_estimate").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let estimate = match estimate_json.as_deref().map(str::trim) {
        None | Some("") | Some("null") => None,
        Some(raw) => Some(
            serde_json::from_str::<EstimateRecord>(raw)
                .map_err(|e| RepositoryError::Decode(format!("estimate for `{id}`: {e}")))?,
        ),
    };

    Ok(ClientJob { id: ClientId(id), name, status, estimate })
}

#[async_trait::async_trait]
impl EstimateRepository for SqlEstimateRepository {
    async fn find_by_id(&self, id: &ClientId) -> Result<Option<ClientJob>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, status, internal_estimate FROM client_job WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_job(r)?)),
            None => Ok(None),
        }
    }

    async fn update_estimate(
        &self,
        id: &ClientId,
        estimate: EstimateRecord,
    ) -> Result<(), RepositoryError> {
        let encoded = encode_estimate(&estimate)?;
        let result = sqlx::query(
            "UPDATE client_job SET internal_estimate = ?, updated_at = ? WHERE id = ?",
        )
        .bind(encoded)
        .bind(Utc::now().to_rfc3339())
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("client job `{id}`")));
        }
        Ok(())
    }

    async fn save(&self, job: ClientJob) -> Result<(), RepositoryError> {
        let encoded = job.estimate.as_ref().map(encode_estimate).transpose()?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO client_job (id, name, status, internal_estimate, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 status = excluded.status,
                 internal_estimate = excluded.internal_estimate,
                 updated_at = excluded.updated_at",
        )
        .bind(&job.id.0)
        .bind(&job.name)
        .bind(&job.status)
        .bind(encoded)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<ClientJob>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, status, internal_estimate FROM client_job ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_job).collect::<Result<Vec<_>, _>>()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use fieldquote_core::domain::estimate::{EstimateRecord, LineItem, PricedLineItem};
    use fieldquote_core::domain::job::{ClientId, ClientJob};
    use fieldquote_core::domain::margin::MarginSet;

    use super::SqlEstimateRepository;
    use crate::repositories::{EstimateRepository, RepositoryError};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn sample_record() -> EstimateRecord {
        EstimateRecord::from_priced(
            vec![PricedLineItem {
                item: LineItem::new("Pipe", Decimal::new(10, 0), "m", Decimal::new(100, 0)),
                unit_price: Decimal::new(140, 0),
                total_price: Decimal::new(1400, 0),
            }],
            Decimal::new(2, 0),
            Some(MarginSet::new(Decimal::new(10, 0), Decimal::new(20, 0), Decimal::new(5, 0))),
        )
    }

    #[tokio::test]
    async fn save_and_find_by_id() {
        let repo = SqlEstimateRepository::new(setup().await);
        let mut job = ClientJob::new("C-1", "Asha Traders");
        job.estimate = Some(sample_record());

        repo.save(job.clone()).await.expect("save");
        let found = repo.find_by_id(&ClientId("C-1".to_string())).await.expect("find");

        assert_eq!(found, Some(job));
    }

    #[tokio::test]
    async fn update_estimate_replaces_stored_record() {
        let repo = SqlEstimateRepository::new(setup().await);
        repo.save(ClientJob::new("C-2", "Ravi")).await.expect("save");

        let id = ClientId("C-2".to_string());
        repo.update_estimate(&id, sample_record()).await.expect("update");

        let found = repo.find_by_id(&id).await.expect("find").expect("exists");
        assert_eq!(found.estimate, Some(sample_record()));
        assert_eq!(found.status, "Estimate Given");
    }

    #[tokio::test]
    async fn update_estimate_for_unknown_job_is_not_found() {
        let repo = SqlEstimateRepository::new(setup().await);

        let result = repo.update_estimate(&ClientId("missing".to_string()), sample_record()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn legacy_column_keys_decode_from_storage() {
        let pool = setup().await;
        sqlx::query(
            "INSERT INTO client_job (id, name, status, internal_estimate, created_at, updated_at)
             VALUES ('C-3', 'Legacy', 'Work Done', ?, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        )
        .bind(
            r#"{"items":[{"Item":"Pipe","Qty":"10","Unit":"m","Base Rate":100,"Total Price":1400}],"days":2,"margins":{"part_margin":15}}"#,
        )
        .execute(&pool)
        .await
        .expect("insert legacy row");

        let repo = SqlEstimateRepository::new(pool);
        let jobs = repo.list().await.expect("list");

        assert_eq!(jobs.len(), 1);
        let record = jobs[0].estimate.as_ref().expect("estimate");
        assert_eq!(record.items[0].item.quantity, Decimal::new(10, 0));
        assert_eq!(record.days, Decimal::new(2, 0));
        assert!(record.margins.as_ref().map(|m| !m.is_short()).unwrap_or(false));
    }
}
