use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Available stock per item name, in canonical units. Read-only input to the stock check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventorySnapshot {
    stock: HashMap<String, Decimal>,
}

impl InventorySnapshot {
    pub fn new(stock: HashMap<String, Decimal>) -> Self {
        Self { stock }
    }

    /// Items absent from the snapshot have zero stock.
    pub fn available(&self, item_name: &str) -> Decimal {
        self.stock.get(item_name).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.stock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }
}

impl FromIterator<(String, Decimal)> for InventorySnapshot {
    fn from_iter<T: IntoIterator<Item = (String, Decimal)>>(iter: T) -> Self {
        Self { stock: iter.into_iter().collect() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDeficit {
    pub item_name: String,
    pub required: Decimal,
    pub available: Decimal,
}

impl StockDeficit {
    pub fn shortfall(&self) -> Decimal {
        self.required - self.available
    }
}
