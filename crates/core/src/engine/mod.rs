pub mod aggregate;
pub mod breakdown;
pub mod line;
pub mod margins;
pub mod profit;
pub mod rounding;
pub mod stock;
pub mod units;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::estimate::{EstimateContext, PricedLineItem};
use crate::domain::inventory::{InventorySnapshot, StockDeficit};
use crate::domain::margin::MarginSet;
use crate::domain::settings::{GlobalSettings, ROUNDING_QUANTUM};
use crate::errors::DomainError;

use self::{
    aggregate::aggregate, line::price_lines, margins::resolve_margins, profit::compute_profit,
    rounding::reconcile, stock::check_stock,
};

/// Everything shown for an estimate: the five headline metrics plus the figures the
/// documents and reports are built from. Always recomputed from inputs, never patched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub items: Vec<PricedLineItem>,
    pub margins: MarginSet,
    pub margin_multiplier: Decimal,
    pub material_total: Decimal,
    pub labor_actual_cost: Decimal,
    pub labor_displayed: Decimal,
    pub raw_grand_total: Decimal,
    pub rounded_grand_total: Decimal,
    pub rounding_delta: Decimal,
    pub total_base_cost: Decimal,
    pub total_profit: Decimal,
    pub advance_amount: Decimal,
}

impl PricingResult {
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        let is_quantum_multiple = |value: Decimal| (value % ROUNDING_QUANTUM).is_zero();

        if self.rounded_grand_total < Decimal::ZERO || !is_quantum_multiple(self.rounded_grand_total) {
            return Err(DomainError::InvariantViolation(format!(
                "rounded grand total {} is not a non-negative multiple of {ROUNDING_QUANTUM}",
                self.rounded_grand_total
            )));
        }
        if self.rounded_grand_total < self.raw_grand_total {
            return Err(DomainError::InvariantViolation(format!(
                "rounded grand total {} is below raw grand total {}",
                self.rounded_grand_total, self.raw_grand_total
            )));
        }
        if self.material_total + self.labor_displayed != self.rounded_grand_total {
            return Err(DomainError::InvariantViolation(format!(
                "material {} + displayed labor {} does not equal grand total {}",
                self.material_total, self.labor_displayed, self.rounded_grand_total
            )));
        }
        if self.total_profit != self.rounded_grand_total - self.total_base_cost {
            return Err(DomainError::InvariantViolation(
                "total profit does not equal grand total minus base cost".to_string(),
            ));
        }
        if self.advance_amount < Decimal::ZERO || !is_quantum_multiple(self.advance_amount) {
            return Err(DomainError::InvariantViolation(format!(
                "advance {} is not a non-negative multiple of {ROUNDING_QUANTUM}",
                self.advance_amount
            )));
        }

        Ok(())
    }
}

/// The single pricing pipeline shared by every consumer.
pub fn price_estimate(context: &EstimateContext, settings: &GlobalSettings) -> PricingResult {
    let margins = resolve_margins(context.margins.as_ref(), &settings.margins);
    let margin_multiplier = margins.multiplier();

    let items = price_lines(&context.items, margin_multiplier);
    let totals = aggregate(&items, context.days, settings);
    let reconciliation = reconcile(totals.raw_grand_total, totals.labor_actual_cost);
    let profit = compute_profit(
        reconciliation.rounded_grand_total,
        totals.total_base_cost,
        settings.advance_fraction(),
    );

    tracing::debug!(
        event_name = "pricing.estimate.computed",
        line_count = items.len(),
        raw_grand_total = %totals.raw_grand_total,
        rounded_grand_total = %reconciliation.rounded_grand_total,
        rounding_delta = %reconciliation.delta,
        "estimate priced"
    );

    PricingResult {
        items,
        margins,
        margin_multiplier,
        material_total: totals.material_total,
        labor_actual_cost: totals.labor_actual_cost,
        labor_displayed: reconciliation.labor_displayed,
        raw_grand_total: totals.raw_grand_total,
        rounded_grand_total: reconciliation.rounded_grand_total,
        rounding_delta: reconciliation.delta,
        total_base_cost: totals.total_base_cost,
        total_profit: profit.total_profit,
        advance_amount: profit.advance_amount,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateEvaluation {
    pub pricing: PricingResult,
    pub stock_deficits: Vec<StockDeficit>,
}

pub trait EstimateEngine: Send + Sync {
    fn evaluate(
        &self,
        context: &EstimateContext,
        settings: &GlobalSettings,
        inventory: Option<&InventorySnapshot>,
    ) -> EstimateEvaluation;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicEstimateEngine;

impl EstimateEngine for DeterministicEstimateEngine {
    fn evaluate(
        &self,
        context: &EstimateContext,
        settings: &GlobalSettings,
        inventory: Option<&InventorySnapshot>,
    ) -> EstimateEvaluation {
        let pricing = price_estimate(context, settings);
        let stock_deficits =
            inventory.map(|inventory| check_stock(&context.items, inventory)).unwrap_or_default();

        EstimateEvaluation { pricing, stock_deficits }
    }
}
