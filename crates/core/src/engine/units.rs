use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::estimate::LineItem;
use crate::domain::numeric::bounded_input;

/// Units a line item may be quoted in. Lengths normalize to meters, counts to pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Pieces,
    Each,
    Meter,
    Centimeter,
    Foot,
    Inch,
}

impl Unit {
    pub const ALL: [Unit; 6] =
        [Unit::Pieces, Unit::Each, Unit::Meter, Unit::Centimeter, Unit::Foot, Unit::Inch];

    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol.trim().to_ascii_lowercase().as_str() {
            "pcs" => Some(Self::Pieces),
            "each" => Some(Self::Each),
            "m" => Some(Self::Meter),
            "cm" => Some(Self::Centimeter),
            "ft" => Some(Self::Foot),
            "in" => Some(Self::Inch),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Pieces => "pcs",
            Self::Each => "each",
            Self::Meter => "m",
            Self::Centimeter => "cm",
            Self::Foot => "ft",
            Self::Inch => "in",
        }
    }

    pub fn factor(self) -> Decimal {
        match self {
            Self::Pieces | Self::Each | Self::Meter => Decimal::ONE,
            Self::Centimeter => Decimal::new(1, 2),
            Self::Foot => Decimal::new(3048, 4),
            Self::Inch => Decimal::new(254, 4),
        }
    }
}

/// Multiplicative factor from `symbol` to its canonical unit. Unknown symbols map to `1`.
pub fn unit_factor(symbol: &str) -> Decimal {
    match Unit::parse(symbol) {
        Some(unit) => unit.factor(),
        None => {
            tracing::debug!(
                event_name = "pricing.unit.unknown_symbol",
                unit = symbol,
                "unknown unit symbol priced with factor 1"
            );
            Decimal::ONE
        }
    }
}

pub fn canonical_quantity(item: &LineItem) -> Decimal {
    bounded_input(item.quantity) * unit_factor(&item.unit)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownUnit {
    pub line_index: usize,
    pub item_name: String,
    pub unit: String,
}

/// Line items whose unit symbol would silently fall back to factor `1`.
pub fn find_unknown_units(items: &[LineItem]) -> Vec<UnknownUnit> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| Unit::parse(&item.unit).is_none())
        .map(|(line_index, item)| UnknownUnit {
            line_index,
            item_name: item.item_name.clone(),
            unit: item.unit.clone(),
        })
        .collect()
}
