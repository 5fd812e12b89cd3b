use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use fieldquote_core::domain::estimate::EstimateRecord;
use fieldquote_core::domain::inventory::InventorySnapshot;
use fieldquote_core::domain::job::{ClientId, ClientJob, PurchaseEntry};
use fieldquote_core::domain::settings::GlobalSettings;
use fieldquote_core::errors::ApplicationError;

pub mod estimate;
pub mod inventory;
pub mod memory;
pub mod purchase;
pub mod settings;

pub use estimate::SqlEstimateRepository;
pub use inventory::SqlInventoryRepository;
pub use memory::{
    InMemoryEstimateRepository, InMemoryInventoryRepository, InMemoryPurchaseRepository,
    InMemorySettingsRepository,
};
pub use purchase::SqlPurchaseRepository;
pub use settings::SqlSettingsRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => Self::NotFound(message),
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// Client jobs and the draft estimate stored with each.
#[async_trait]
pub trait EstimateRepository: Send + Sync {
    async fn find_by_id(&self, id: &ClientId) -> Result<Option<ClientJob>, RepositoryError>;
    /// Fails with `NotFound` when no job with `id` exists.
    async fn update_estimate(
        &self,
        id: &ClientId,
        estimate: EstimateRecord,
    ) -> Result<(), RepositoryError>;
    async fn save(&self, job: ClientJob) -> Result<(), RepositoryError>;
    async fn list(&self) -> Result<Vec<ClientJob>, RepositoryError>;
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Items never stocked report zero.
    async fn get_stock(&self, item_name: &str) -> Result<Decimal, RepositoryError>;
    async fn set_stock(&self, item_name: &str, quantity: Decimal) -> Result<(), RepositoryError>;
    async fn snapshot(&self) -> Result<InventorySnapshot, RepositoryError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Built-in defaults when nothing has been saved yet.
    async fn load(&self) -> Result<GlobalSettings, RepositoryError>;
    async fn save(&self, settings: &GlobalSettings) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    async fn record(&self, entry: PurchaseEntry) -> Result<(), RepositoryError>;
    async fn list_costs(&self) -> Result<Vec<Decimal>, RepositoryError>;
}

pub(crate) fn decode_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    fieldquote_core::domain::numeric::parse_decimal_text(raw.trim())
        .ok_or_else(|| RepositoryError::Decode(format!("column `{column}` holds `{raw}`")))
}

#[cfg(test)]
mod tests {
    use fieldquote_core::errors::ApplicationError;

    use super::RepositoryError;

    #[test]
    fn repository_errors_lift_into_the_application_layer() {
        assert_eq!(
            ApplicationError::from(RepositoryError::NotFound("client job `C-1`".to_owned())),
            ApplicationError::NotFound("client job `C-1`".to_owned())
        );
        assert!(matches!(
            ApplicationError::from(RepositoryError::Decode("column `rate` holds `x`".to_owned())),
            ApplicationError::Persistence(ref message) if message.contains("rate")
        ));
    }
}
