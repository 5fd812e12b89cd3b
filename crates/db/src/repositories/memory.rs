use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use fieldquote_core::domain::estimate::EstimateRecord;
use fieldquote_core::domain::inventory::InventorySnapshot;
use fieldquote_core::domain::job::{ClientId, ClientJob, PurchaseEntry};
use fieldquote_core::domain::settings::GlobalSettings;

use super::{
    EstimateRepository, InventoryRepository, PurchaseRepository, RepositoryError,
    SettingsRepository,
};

#[derive(Default)]
pub struct InMemoryEstimateRepository {
    jobs: RwLock<Vec<ClientJob>>,
}

#[async_trait::async_trait]
impl EstimateRepository for InMemoryEstimateRepository {
    async fn find_by_id(&self, id: &ClientId) -> Result<Option<ClientJob>, RepositoryError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.iter().find(|job| &job.id == id).cloned())
    }

    async fn update_estimate(
        &self,
        id: &ClientId,
        estimate: EstimateRecord,
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .iter_mut()
            .find(|job| &job.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("client job `{id}`")))?;
        job.estimate = Some(estimate);
        Ok(())
    }

    async fn save(&self, job: ClientJob) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        match jobs.iter_mut().find(|existing| existing.id == job.id) {
            Some(existing) => *existing = job,
            None => jobs.push(job),
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ClientJob>, RepositoryError> {
        Ok(self.jobs.read().await.clone())
    }
}

#[derive(Default)]
pub struct InMemoryInventoryRepository {
    stock: RwLock<HashMap<String, Decimal>>,
}

#[async_trait::async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn get_stock(&self, item_name: &str) -> Result<Decimal, RepositoryError> {
        let stock = self.stock.read().await;
        Ok(stock.get(item_name).copied().unwrap_or(Decimal::ZERO))
    }

    async fn set_stock(&self, item_name: &str, quantity: Decimal) -> Result<(), RepositoryError> {
        let mut stock = self.stock.write().await;
        stock.insert(item_name.to_string(), quantity);
        Ok(())
    }

    async fn snapshot(&self) -> Result<InventorySnapshot, RepositoryError> {
        let stock = self.stock.read().await;
        Ok(InventorySnapshot::new(stock.clone()))
    }
}

#[derive(Default)]
pub struct InMemorySettingsRepository {
    settings: RwLock<Option<GlobalSettings>>,
}

#[async_trait::async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load(&self) -> Result<GlobalSettings, RepositoryError> {
        Ok(self.settings.read().await.unwrap_or_default())
    }

    async fn save(&self, settings: &GlobalSettings) -> Result<(), RepositoryError> {
        *self.settings.write().await = Some(*settings);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPurchaseRepository {
    entries: RwLock<Vec<PurchaseEntry>>,
}

#[async_trait::async_trait]
impl PurchaseRepository for InMemoryPurchaseRepository {
    async fn record(&self, entry: PurchaseEntry) -> Result<(), RepositoryError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list_costs(&self) -> Result<Vec<Decimal>, RepositoryError> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|entry| entry.total_cost).collect())
    }
}
