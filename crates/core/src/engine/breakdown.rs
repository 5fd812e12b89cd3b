use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::line::line_base_cost;
use crate::engine::PricingResult;
use crate::errors::DomainError;

/// Confidential per-line view of where the profit in an estimate comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitRow {
    pub item_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub base_rate: Decimal,
    pub base_cost: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub row_profit: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub rows: Vec<ProfitRow>,
    pub material_profit: Decimal,
    pub labor_cost: Decimal,
    pub labor_charged: Decimal,
    pub labor_profit: Decimal,
    pub total_revenue: Decimal,
    pub total_base_cost: Decimal,
    pub net_profit: Decimal,
}

impl ProfitBreakdown {
    pub fn from_pricing(pricing: &PricingResult) -> Self {
        let rows: Vec<ProfitRow> = pricing
            .items
            .iter()
            .map(|line| {
                let base_cost = line_base_cost(&line.item);
                ProfitRow {
                    item_name: line.item.item_name.clone(),
                    quantity: line.item.quantity,
                    unit: line.item.unit.clone(),
                    base_rate: line.item.base_rate,
                    base_cost,
                    unit_price: line.unit_price,
                    total_price: line.total_price,
                    row_profit: line.total_price - base_cost,
                }
            })
            .collect();

        Self {
            material_profit: sum_row_profit(&rows),
            rows,
            labor_cost: pricing.labor_actual_cost,
            labor_charged: pricing.labor_displayed,
            labor_profit: pricing.labor_displayed - pricing.labor_actual_cost,
            total_revenue: pricing.rounded_grand_total,
            total_base_cost: pricing.total_base_cost,
            net_profit: pricing.total_profit,
        }
    }

    pub fn check_invariants(&self) -> Result<(), DomainError> {
        let rows_total = sum_row_profit(&self.rows);
        if rows_total != self.material_profit {
            return Err(DomainError::InvariantViolation(format!(
                "row profits {rows_total} do not add up to material profit {}",
                self.material_profit
            )));
        }
        let explained = self.material_profit + self.labor_profit;
        if explained != self.net_profit {
            return Err(DomainError::InvariantViolation(format!(
                "row and labor profit {explained} do not add up to net profit {}",
                self.net_profit
            )));
        }
        Ok(())
    }
}

fn sum_row_profit(rows: &[ProfitRow]) -> Decimal {
    rows.iter().map(|row| row.row_profit).sum()
}
