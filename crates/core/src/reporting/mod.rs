use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::job::ClientJob;
use crate::domain::settings::GlobalSettings;
use crate::engine::price_estimate;

/// Business-wide profit and loss over finished jobs.
///
/// Revenue is what was quoted (rounded grand totals). Expenses are actual labor days at the
/// current daily rate plus cash spent in the purchase log, not the base cost of quoted items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLossReport {
    pub jobs_counted: usize,
    pub total_revenue: Decimal,
    pub labor_expense: Decimal,
    pub material_expense: Decimal,
    pub net_profit: Decimal,
    pub net_margin_pct: Decimal,
}

impl ProfitAndLossReport {
    pub fn compute(
        jobs: &[ClientJob],
        purchase_costs: &[Decimal],
        settings: &GlobalSettings,
    ) -> Self {
        let mut jobs_counted = 0;
        let mut total_revenue = Decimal::ZERO;
        let mut labor_expense = Decimal::ZERO;

        for job in jobs.iter().filter(|job| job.counts_toward_profit_and_loss()) {
            let Some(record) = job.estimate.as_ref() else {
                continue;
            };
            let context = record.context();
            let pricing = price_estimate(&context, settings);

            jobs_counted += 1;
            total_revenue = total_revenue.saturating_add(pricing.rounded_grand_total);
            labor_expense = labor_expense.saturating_add(pricing.labor_actual_cost);
        }

        // Purchase costs come straight from stored rows and are not bounded on decode.
        let material_expense = purchase_costs
            .iter()
            .fold(Decimal::ZERO, |total, cost| total.saturating_add(*cost));
        let net_profit =
            total_revenue.saturating_sub(labor_expense).saturating_sub(material_expense);
        let net_margin_pct = net_profit
            .checked_div(total_revenue)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO);

        tracing::debug!(
            event_name = "reporting.pnl.computed",
            jobs_counted,
            total_revenue = %total_revenue,
            net_profit = %net_profit,
            "profit and loss computed"
        );

        Self {
            jobs_counted,
            total_revenue,
            labor_expense,
            material_expense,
            net_profit,
            net_margin_pct,
        }
    }
}
