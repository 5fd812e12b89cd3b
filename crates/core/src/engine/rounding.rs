use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::settings::ROUNDING_QUANTUM;

/// Rounds up (never down or to nearest) to the next multiple of the rounding quantum.
pub fn round_up_to_quantum(amount: Decimal) -> Decimal {
    (amount / ROUNDING_QUANTUM).ceil() * ROUNDING_QUANTUM
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub rounded_grand_total: Decimal,
    pub labor_displayed: Decimal,
    pub delta: Decimal,
}

/// Rounds the grand total up and folds the remainder into the displayed labor figure, so
/// material lines stay at their computed prices while the subtotals still add up.
pub fn reconcile(raw_grand_total: Decimal, labor_actual_cost: Decimal) -> Reconciliation {
    let rounded_grand_total = round_up_to_quantum(raw_grand_total);
    let delta = rounded_grand_total - raw_grand_total;

    Reconciliation { rounded_grand_total, labor_displayed: labor_actual_cost + delta, delta }
}
