use clap::Args;
use serde::Serialize;

use fieldquote_core::domain::inventory::StockDeficit;
use fieldquote_core::domain::job::ClientId;
use fieldquote_core::engine::{DeterministicEstimateEngine, EstimateEngine, PricingResult};
use fieldquote_core::errors::ApplicationError;
use fieldquote_db::repositories::{
    SqlEstimateRepository, SqlInventoryRepository, SqlSettingsRepository,
};
use fieldquote_db::{EstimateRepository, InventoryRepository, SettingsRepository};

use crate::commands::{
    build_runtime, load_config, open_store, render_document, CommandResult, DocumentKind,
    Failure, EXIT_NOT_FOUND,
};

const COMMAND: &str = "record";

#[derive(Debug, Clone, Args)]
pub struct RecordArgs {
    pub client_id: String,
    #[arg(long, value_enum)]
    pub document: Option<DocumentKind>,
}

#[derive(Debug, Serialize)]
struct RecordPayload {
    client_id: String,
    client_name: String,
    job_status: String,
    pricing: PricingResult,
    stock_deficits: Vec<StockDeficit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<String>,
}

fn not_found(message: String) -> Failure {
    Failure::new("not_found", EXIT_NOT_FOUND, ApplicationError::NotFound(message))
}

pub fn run(args: &RecordArgs) -> CommandResult {
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
        let estimates = SqlEstimateRepository::new(pool.clone());
        let settings_repo = SqlSettingsRepository::new(pool.clone());
        let inventory_repo = SqlInventoryRepository::new(pool.clone());

        let id = ClientId(args.client_id.clone());
        let job = estimates
            .find_by_id(&id)
            .await
            .map_err(Failure::persistence)?
            .ok_or_else(|| not_found(format!("no client job `{id}`")))?;
        let record = job
            .estimate
            .as_ref()
            .ok_or_else(|| not_found(format!("client job `{id}` has no saved estimate")))?;

        let settings = settings_repo.load().await.map_err(Failure::persistence)?;
        let inventory = inventory_repo.snapshot().await.map_err(Failure::persistence)?;
        pool.close().await;

        let evaluation =
            DeterministicEstimateEngine.evaluate(&record.context(), &settings, Some(&inventory));
        evaluation.pricing.check_invariants().map_err(Failure::domain)?;

        let document = args
            .document
            .map(|kind| render_document(kind, &job.name, &evaluation.pricing))
            .transpose()?;

        Ok::<RecordPayload, Failure>(RecordPayload {
            client_id: job.id.0.clone(),
            client_name: job.name.clone(),
            job_status: job.status.clone(),
            pricing: evaluation.pricing,
            stock_deficits: evaluation.stock_deficits,
            document,
        })
    });

    match result {
        Ok(payload) => CommandResult::success_with(COMMAND, &payload),
        Err(failure) => CommandResult::failure(COMMAND, failure),
    }
}
