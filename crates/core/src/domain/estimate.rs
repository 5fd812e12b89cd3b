use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::margin::{MarginOverride, MarginSet};
use crate::domain::numeric::{
    bounded_input, lenient_bounded, lenient_decimal, lenient_string,
};
use crate::engine::PricingResult;

pub const DEFAULT_UNIT: &str = "pcs";

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

fn lenient_unit<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient_string(deserializer).map(normalize_unit_symbol)
}

fn normalize_unit_symbol(symbol: String) -> String {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return default_unit();
    }
    trimmed.to_string()
}

/// One material row of a draft estimate.
///
/// Older stored records use the grid column titles (`Item`, `Qty`, `Unit`, `Base Rate`)
/// as keys; both spellings decode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, alias = "Item", deserialize_with = "lenient_string")]
    pub item_name: String,
    #[serde(default, alias = "Qty", deserialize_with = "lenient_bounded")]
    pub quantity: Decimal,
    #[serde(default = "default_unit", alias = "Unit", deserialize_with = "lenient_unit")]
    pub unit: String,
    /// Cost per canonical unit.
    #[serde(default, alias = "Base Rate", deserialize_with = "lenient_bounded")]
    pub base_rate: Decimal,
}

impl LineItem {
    pub fn new(
        item_name: impl Into<String>,
        quantity: Decimal,
        unit: impl Into<String>,
        base_rate: Decimal,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            quantity: bounded_input(quantity),
            unit: normalize_unit_symbol(unit.into()),
            base_rate: bounded_input(base_rate),
        }
    }
}

/// A line item carrying the sell figures computed for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLineItem {
    #[serde(flatten)]
    pub item: LineItem,
    #[serde(default, alias = "Unit Price", deserialize_with = "lenient_decimal")]
    pub unit_price: Decimal,
    #[serde(default, alias = "Total Price", deserialize_with = "lenient_decimal")]
    pub total_price: Decimal,
}

/// Pipeline input: everything a price depends on apart from the global settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateContext {
    #[serde(default, deserialize_with = "lenient_bounded")]
    pub days: Decimal,
    #[serde(default)]
    pub margins: Option<MarginOverride>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl EstimateContext {
    pub fn new(items: Vec<LineItem>, days: Decimal, margins: Option<MarginOverride>) -> Self {
        Self { days: bounded_input(days), margins, items }
    }
}

/// Round-trippable persisted form: `{items, days, margins: null | {p, l, e}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateRecord {
    #[serde(default)]
    pub items: Vec<PricedLineItem>,
    #[serde(default, deserialize_with = "lenient_bounded")]
    pub days: Decimal,
    #[serde(default)]
    pub margins: Option<MarginOverride>,
}

impl EstimateRecord {
    /// Builds the stored record from freshly priced lines. `custom_margins` is `None` when
    /// the estimate follows the global defaults, so later default changes still apply.
    pub fn from_priced(
        items: Vec<PricedLineItem>,
        days: Decimal,
        custom_margins: Option<MarginSet>,
    ) -> Self {
        Self {
            items,
            days: bounded_input(days),
            margins: custom_margins.map(MarginOverride::from),
        }
    }

    pub fn from_evaluation(
        context: &EstimateContext,
        pricing: &PricingResult,
        custom_margins: Option<MarginSet>,
    ) -> Self {
        Self::from_priced(pricing.items.clone(), context.days, custom_margins)
    }

    pub fn context(&self) -> EstimateContext {
        EstimateContext::new(
            self.items.iter().map(|line| line.item.clone()).collect(),
            self.days,
            self.margins.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{EstimateRecord, LineItem};

    #[test]
    fn partially_edited_rows_decode_to_zero() {
        let item: LineItem =
            serde_json::from_value(json!({"item_name": "Cable", "quantity": "", "base_rate": null}))
                .expect("decode");

        assert_eq!(item.quantity, Decimal::ZERO);
        assert_eq!(item.base_rate, Decimal::ZERO);
        assert_eq!(item.unit, "pcs");
    }

    #[test]
    fn legacy_column_keys_decode() {
        let item: LineItem = serde_json::from_value(
            json!({"Item": "Pipe", "Qty": 10, "Unit": "m", "Base Rate": "100"}),
        )
        .expect("decode");

        assert_eq!(item, LineItem::new("Pipe", Decimal::new(10, 0), "m", Decimal::new(100, 0)));
    }

    #[test]
    fn negative_quantities_are_clamped() {
        let item = LineItem::new("Pipe", Decimal::new(-3, 0), " ", Decimal::new(-1, 0));
        assert_eq!(item.quantity, Decimal::ZERO);
        assert_eq!(item.base_rate, Decimal::ZERO);
        assert_eq!(item.unit, "pcs");
    }

    #[test]
    fn legacy_record_decodes_into_context() {
        let record: EstimateRecord = serde_json::from_value(json!({
            "items": [
                {"Item": "Pipe", "Qty": 10, "Unit": "m", "Base Rate": 100, "Unit Price": 140, "Total Price": 1400}
            ],
            "days": 2,
            "margins": {"p": 15, "l": 20, "e": 5}
        }))
        .expect("decode");

        let context = record.context();
        assert_eq!(context.items.len(), 1);
        assert_eq!(context.days, Decimal::new(2, 0));
        assert!(context.margins.as_ref().map(|m| m.is_short()).unwrap_or(false));
        assert_eq!(record.items[0].total_price, Decimal::new(1400, 0));
    }
}
