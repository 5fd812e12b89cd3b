use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::estimate::{LineItem, PricedLineItem};
use crate::domain::numeric::bounded_input;
use crate::engine::units::canonical_quantity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePrice {
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// `total = base_rate × canonical_qty × multiplier`; `unit = total / quantity`, or `0`
/// for a zero quantity.
///
/// `LineItem` fields are public, so quantity and rate are bounded again here before
/// multiplying.
pub fn price_line(item: &LineItem, margin_multiplier: Decimal) -> LinePrice {
    let quantity = bounded_input(item.quantity);
    let total_price = line_base_cost(item) * margin_multiplier;
    let unit_price = if quantity > Decimal::ZERO { total_price / quantity } else { Decimal::ZERO };

    LinePrice { unit_price, total_price }
}

/// Unmarked-up cost of the line in canonical units.
pub fn line_base_cost(item: &LineItem) -> Decimal {
    bounded_input(item.base_rate) * canonical_quantity(item)
}

pub fn price_lines(items: &[LineItem], margin_multiplier: Decimal) -> Vec<PricedLineItem> {
    items
        .iter()
        .map(|item| {
            let price = price_line(item, margin_multiplier);
            PricedLineItem {
                item: item.clone(),
                unit_price: price.unit_price,
                total_price: price.total_price,
            }
        })
        .collect()
}
