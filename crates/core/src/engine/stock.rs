use crate::domain::estimate::LineItem;
use crate::domain::inventory::{InventorySnapshot, StockDeficit};
use crate::engine::units::canonical_quantity;

/// Advisory shortfall list; never blocks pricing or saving.
pub fn check_stock(items: &[LineItem], inventory: &InventorySnapshot) -> Vec<StockDeficit> {
    let deficits: Vec<StockDeficit> = items
        .iter()
        .filter_map(|item| {
            let required = canonical_quantity(item);
            let available = inventory.available(&item.item_name);
            (required > available).then(|| StockDeficit {
                item_name: item.item_name.clone(),
                required,
                available,
            })
        })
        .collect();

    if !deficits.is_empty() {
        tracing::debug!(
            event_name = "pricing.stock.deficits_found",
            deficit_count = deficits.len(),
            "estimate requests more than available stock"
        );
    }

    deficits
}
