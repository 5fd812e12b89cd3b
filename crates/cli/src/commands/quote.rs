use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

use fieldquote_core::domain::estimate::EstimateRecord;
use fieldquote_core::domain::inventory::{InventorySnapshot, StockDeficit};
use fieldquote_core::engine::units::find_unknown_units;
use fieldquote_core::engine::{DeterministicEstimateEngine, EstimateEngine, PricingResult};
use fieldquote_core::errors::{ApplicationError, DomainError};

use crate::commands::{
    load_config, render_document, CommandResult, DocumentKind, Failure, EXIT_INPUT,
};

const COMMAND: &str = "quote";

#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    /// JSON estimate record: `{items, days, margins}`.
    #[arg(long)]
    pub estimate: PathBuf,
    /// JSON object of available stock per item name.
    #[arg(long)]
    pub inventory: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub document: Option<DocumentKind>,
    #[arg(long, default_value = "Client")]
    pub client_name: String,
}

#[derive(Debug, Serialize)]
struct QuotePayload {
    /// Markup as a share of the sell price, as shown next to the margin inputs.
    gross_margin_pct: Decimal,
    pricing: PricingResult,
    stock_deficits: Vec<StockDeficit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<String>,
}

pub fn run(args: &QuoteArgs) -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    match quote(args, config.pricing.strict_units, &config.global_settings()) {
        Ok(payload) => CommandResult::success_with(COMMAND, &payload),
        Err(failure) => CommandResult::failure(COMMAND, failure),
    }
}

fn quote(
    args: &QuoteArgs,
    strict_units: bool,
    settings: &fieldquote_core::GlobalSettings,
) -> Result<QuotePayload, Failure> {
    let record: EstimateRecord =
        read_json(&args.estimate, "estimate").map_err(JsonReadFailure::into_estimate_failure)?;
    let context = record.context();

    if strict_units {
        let unknown = find_unknown_units(&context.items);
        if !unknown.is_empty() {
            return Err(Failure::domain(DomainError::UnknownUnits(unknown)));
        }
    }

    let inventory = match &args.inventory {
        Some(path) => Some(
            read_json::<InventorySnapshot>(path, "inventory")
                .map_err(JsonReadFailure::into_input_failure)?,
        ),
        None => None,
    };

    let evaluation = DeterministicEstimateEngine.evaluate(&context, settings, inventory.as_ref());
    evaluation.pricing.check_invariants().map_err(Failure::domain)?;

    tracing::info!(
        event_name = "cli.quote.priced",
        line_count = context.items.len(),
        rounded_grand_total = %evaluation.pricing.rounded_grand_total,
        stock_deficits = evaluation.stock_deficits.len(),
        "estimate priced"
    );

    let document = args
        .document
        .map(|kind| render_document(kind, &args.client_name, &evaluation.pricing))
        .transpose()?;

    Ok(QuotePayload {
        gross_margin_pct: evaluation.pricing.margins.gross_margin_pct().round_dp(2),
        pricing: evaluation.pricing,
        stock_deficits: evaluation.stock_deficits,
        document,
    })
}

/// Distinguishes unreadable or malformed JSON from well-formed JSON of the wrong shape.
enum JsonReadFailure {
    Read(String),
    Syntax(String),
    Shape(String),
}

impl JsonReadFailure {
    /// Valid JSON that is not an estimate record is rejected as an invalid estimate.
    fn into_estimate_failure(self) -> Failure {
        match self {
            Self::Shape(message) => Failure::domain(DomainError::InvalidEstimate(message)),
            other => other.into_input_failure(),
        }
    }

    fn into_input_failure(self) -> Failure {
        match self {
            Self::Read(message) => {
                Failure::new("input_read", EXIT_INPUT, ApplicationError::Input(message))
            }
            Self::Syntax(message) | Self::Shape(message) => {
                Failure::new("input_parse", EXIT_INPUT, ApplicationError::Input(message))
            }
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    label: &str,
) -> Result<T, JsonReadFailure> {
    let raw = fs::read_to_string(path).map_err(|error| {
        JsonReadFailure::Read(format!("could not read {label} file `{}`: {error}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|error| {
        let message = format!("could not parse {label} file `{}`: {error}", path.display());
        if error.is_data() {
            JsonReadFailure::Shape(message)
        } else {
            JsonReadFailure::Syntax(message)
        }
    })
}
