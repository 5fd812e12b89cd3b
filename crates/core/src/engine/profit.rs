use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::rounding::round_up_to_quantum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitSummary {
    pub total_profit: Decimal,
    pub advance_amount: Decimal,
}

/// The advance covers the full base cost plus `advance_fraction` of projected profit,
/// rounded up.
///
/// A negative profit (quoted below cost) goes through the same formula unchanged.
pub fn compute_profit(
    rounded_grand_total: Decimal,
    total_base_cost: Decimal,
    advance_fraction: Decimal,
) -> ProfitSummary {
    let total_profit = rounded_grand_total - total_base_cost;
    let advance_amount = round_up_to_quantum(total_base_cost + total_profit * advance_fraction);

    ProfitSummary { total_profit, advance_amount }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{compute_profit, ProfitSummary};
    use crate::domain::settings::ADVANCE_FRACTION;

    fn standard(rounded_grand_total: Decimal, total_base_cost: Decimal) -> ProfitSummary {
        compute_profit(rounded_grand_total, total_base_cost, ADVANCE_FRACTION)
    }

    #[test]
    fn advance_covers_cost_plus_tenth_of_profit() {
        let summary = standard(Decimal::new(3400, 0), Decimal::new(3000, 0));
        assert_eq!(summary.total_profit, Decimal::new(400, 0));
        assert_eq!(summary.advance_amount, Decimal::new(3100, 0));
    }

    #[test]
    fn advance_rounds_up_to_hundreds() {
        let summary = standard(Decimal::new(3500, 0), Decimal::new(30455, 1));
        assert_eq!(summary.total_profit, Decimal::new(4545, 1));
        // 3045.5 + 45.45 = 3090.95
        assert_eq!(summary.advance_amount, Decimal::new(3100, 0));
    }

    #[test]
    fn negative_profit_keeps_the_formula() {
        let summary = standard(Decimal::new(2000, 0), Decimal::new(2500, 0));
        assert_eq!(summary.total_profit, Decimal::new(-500, 0));
        // 2500 - 50 = 2450
        assert_eq!(summary.advance_amount, Decimal::new(2500, 0));
    }

    #[test]
    fn advance_fraction_is_a_parameter() {
        let half = Decimal::new(5, 1);
        let summary = compute_profit(Decimal::new(3400, 0), Decimal::new(3000, 0), half);
        // 3000 + 200 = 3200
        assert_eq!(summary.advance_amount, Decimal::new(3200, 0));
    }
}
