use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::estimate::EstimateRecord;
use crate::domain::numeric::bounded_input;

/// Job statuses whose estimates count as earned revenue.
pub const PROFIT_AND_LOSS_STATUSES: [&str; 2] = ["Work Done", "Closed"];

pub const NEW_JOB_STATUS: &str = "Estimate Given";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A client record together with its draft estimate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientJob {
    pub id: ClientId,
    pub name: String,
    pub status: String,
    pub estimate: Option<EstimateRecord>,
}

impl ClientJob {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ClientId(id.into()),
            name: name.into(),
            status: NEW_JOB_STATUS.to_string(),
            estimate: None,
        }
    }

    pub fn counts_toward_profit_and_loss(&self) -> bool {
        PROFIT_AND_LOSS_STATUSES.contains(&self.status.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseId(pub Uuid);

/// Stock bought from a supplier; `total_cost` is cash out for profit-and-loss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseEntry {
    pub id: PurchaseId,
    pub item_name: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub total_cost: Decimal,
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseEntry {
    pub fn new(item_name: impl Into<String>, quantity: Decimal, rate: Decimal) -> Self {
        let quantity = bounded_input(quantity);
        let rate = bounded_input(rate);
        Self {
            id: PurchaseId(Uuid::new_v4()),
            item_name: item_name.into(),
            quantity,
            rate,
            total_cost: quantity * rate,
            purchased_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{ClientJob, PurchaseEntry};

    #[test]
    fn only_finished_jobs_count_toward_profit_and_loss() {
        let mut job = ClientJob::new("C-1", "Asha Traders");
        assert!(!job.counts_toward_profit_and_loss());

        job.status = "Work Done".to_string();
        assert!(job.counts_toward_profit_and_loss());

        job.status = "Closed".to_string();
        assert!(job.counts_toward_profit_and_loss());
    }

    #[test]
    fn purchase_total_is_quantity_times_rate() {
        let entry = PurchaseEntry::new("Cable", Decimal::new(25, 1), Decimal::new(80, 0));
        assert_eq!(entry.total_cost, Decimal::new(200, 0));
    }
}
