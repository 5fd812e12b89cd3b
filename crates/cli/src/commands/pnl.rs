use fieldquote_core::reporting::ProfitAndLossReport;
use fieldquote_db::repositories::{
    SqlEstimateRepository, SqlPurchaseRepository, SqlSettingsRepository,
};
use fieldquote_db::{EstimateRepository, PurchaseRepository, SettingsRepository};

use crate::commands::{build_runtime, load_config, open_store, CommandResult, Failure};

const COMMAND: &str = "pnl";

pub fn run() -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_store(&config).await?;
        let jobs = SqlEstimateRepository::new(pool.clone()).list().await;
        let costs = SqlPurchaseRepository::new(pool.clone()).list_costs().await;
        let settings = SqlSettingsRepository::new(pool.clone()).load().await;
        pool.close().await;

        let jobs = jobs.map_err(Failure::persistence)?;
        let costs = costs.map_err(Failure::persistence)?;
        let settings = settings.map_err(Failure::persistence)?;

        Ok::<ProfitAndLossReport, Failure>(ProfitAndLossReport::compute(&jobs, &costs, &settings))
    });

    match result {
        Ok(report) => CommandResult::success_with(COMMAND, &serde_json::json!({ "report": report })),
        Err(failure) => CommandResult::failure(COMMAND, failure),
    }
}
