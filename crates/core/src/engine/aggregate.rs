use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::estimate::PricedLineItem;
use crate::domain::numeric::bounded_input;
use crate::domain::settings::GlobalSettings;
use crate::engine::line::line_base_cost;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateTotals {
    pub material_total: Decimal,
    pub labor_actual_cost: Decimal,
    pub raw_grand_total: Decimal,
    /// Materials at base rate plus actual labor; no margin applied.
    pub total_base_cost: Decimal,
}

pub fn aggregate(
    items: &[PricedLineItem],
    days: Decimal,
    settings: &GlobalSettings,
) -> EstimateTotals {
    let material_total: Decimal = items.iter().map(|line| line.total_price).sum();
    let material_base_cost: Decimal = items.iter().map(|line| line_base_cost(&line.item)).sum();
    let labor_actual_cost = bounded_input(days) * bounded_input(settings.daily_labor_rate);

    EstimateTotals {
        material_total,
        labor_actual_cost,
        raw_grand_total: material_total + labor_actual_cost,
        total_base_cost: material_base_cost + labor_actual_cost,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::aggregate;
    use crate::domain::estimate::LineItem;
    use crate::domain::settings::GlobalSettings;
    use crate::engine::line::price_lines;

    #[test]
    fn sums_materials_and_labor() {
        let items = vec![
            LineItem::new("Pipe", Decimal::new(10, 0), "m", Decimal::new(100, 0)),
            LineItem::new("Elbow", Decimal::new(4, 0), "pcs", Decimal::new(25, 0)),
        ];
        let priced = price_lines(&items, Decimal::new(140, 2));

        let totals = aggregate(&priced, Decimal::new(2, 0), &GlobalSettings::default());
        assert_eq!(totals.material_total, Decimal::new(1540, 0));
        assert_eq!(totals.labor_actual_cost, Decimal::new(2000, 0));
        assert_eq!(totals.raw_grand_total, Decimal::new(3540, 0));
        assert_eq!(totals.total_base_cost, Decimal::new(3100, 0));
    }

    #[test]
    fn empty_estimate_is_labor_only() {
        let totals = aggregate(&[], Decimal::new(15, 1), &GlobalSettings::default());
        assert_eq!(totals.material_total, Decimal::ZERO);
        assert_eq!(totals.raw_grand_total, Decimal::new(1500, 0));
        assert_eq!(totals.total_base_cost, Decimal::new(1500, 0));
    }
}
