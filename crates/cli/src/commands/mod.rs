pub mod config;
pub mod migrate;
pub mod pnl;
pub mod quote;
pub mod record;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Value};

use fieldquote_core::config::{AppConfig, LoadOptions};
use fieldquote_core::engine::breakdown::ProfitBreakdown;
use fieldquote_core::engine::PricingResult;
use fieldquote_core::errors::{ApplicationError, DomainError};
use fieldquote_core::{DocumentRenderer, TeraDocumentRenderer};
use fieldquote_db::{connect_with_settings, migrations, DbPool};
use uuid::Uuid;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME: u8 = 3;
pub const EXIT_DB_CONNECTIVITY: u8 = 4;
pub const EXIT_MIGRATION: u8 = 5;
pub const EXIT_INPUT: u8 = 6;
pub const EXIT_DOMAIN: u8 = 7;
pub const EXIT_NOT_FOUND: u8 = 8;
pub const EXIT_DOCUMENT: u8 = 9;
pub const EXIT_PERSISTENCE: u8 = 10;

/// A command failure: the layered application error plus how the CLI reports it.
#[derive(Debug)]
pub struct Failure {
    pub error_class: &'static str,
    pub exit_code: u8,
    pub error: ApplicationError,
}

impl Failure {
    pub fn new(
        error_class: &'static str,
        exit_code: u8,
        error: impl Into<ApplicationError>,
    ) -> Self {
        Self { error_class, exit_code, error: error.into() }
    }

    pub(crate) fn persistence(error: impl Into<ApplicationError>) -> Self {
        let error = error.into();
        let (error_class, exit_code) = match error {
            ApplicationError::NotFound(_) => ("not_found", EXIT_NOT_FOUND),
            _ => ("persistence", EXIT_PERSISTENCE),
        };
        Self { error_class, exit_code, error }
    }

    pub(crate) fn domain(error: DomainError) -> Self {
        let error_class = match error {
            DomainError::UnknownUnits(_) => "unknown_units",
            DomainError::InvalidEstimate(_) => "invalid_estimate",
            DomainError::InvariantViolation(_) => "invariant_violation",
        };
        Self::new(error_class, EXIT_DOMAIN, error)
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            user_message: None,
            correlation_id: None,
        };
        Self { exit_code: 0, output: serialize_payload(&payload) }
    }

    /// Success carrying a command-specific payload; its fields are merged next to
    /// `command` and `status`.
    pub fn success_with(command: &str, payload: &impl Serialize) -> Self {
        let mut object = Map::new();
        object.insert("command".to_string(), Value::String(command.to_string()));
        object.insert("status".to_string(), Value::String("ok".to_string()));
        object.insert("error_class".to_string(), Value::Null);

        match serde_json::to_value(payload) {
            Ok(Value::Object(fields)) => object.extend(fields),
            Ok(other) => {
                object.insert("result".to_string(), other);
            }
            Err(error) => {
                return Self::failure(
                    command,
                    Failure::new(
                        "serialization",
                        EXIT_RUNTIME,
                        ApplicationError::Runtime(error.to_string()),
                    ),
                )
            }
        }

        Self { exit_code: 0, output: serialize_payload(&Value::Object(object)) }
    }

    /// Reports `failure` through the interface layer under a fresh correlation id.
    pub fn failure(command: &str, failure: Failure) -> Self {
        let Failure { error_class, exit_code, error } = failure;
        let message = error.to_string();
        let interface = error.into_interface(Uuid::new_v4().to_string());

        tracing::warn!(
            event_name = "cli.command.failed",
            command,
            error_class,
            exit_code,
            correlation_id = interface.correlation_id(),
            "command failed"
        );
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message,
            user_message: Some(interface.user_message().to_string()),
            correlation_id: Some(interface.correlation_id().to_string()),
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }
}

fn serialize_payload(payload: &impl Serialize) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DocumentKind {
    /// Customer-facing estimate.
    Client,
    /// Confidential per-line profit breakdown.
    Internal,
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, Failure::new("config_validation", EXIT_CONFIG, error))
    })
}

pub(crate) fn build_runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            Failure::new(
                "runtime_init",
                EXIT_RUNTIME,
                ApplicationError::Runtime(format!("failed to initialize async runtime: {error}")),
            ),
        )
    })
}

/// Connects and brings the schema up to date.
pub(crate) async fn open_store(config: &AppConfig) -> Result<DbPool, Failure> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| {
        Failure::new(
            "db_connectivity",
            EXIT_DB_CONNECTIVITY,
            ApplicationError::Persistence(error.to_string()),
        )
    })?;
    migrations::run_pending(&pool).await.map_err(|error| {
        Failure::new("migration", EXIT_MIGRATION, ApplicationError::Persistence(error.to_string()))
    })?;
    Ok(pool)
}

pub(crate) fn render_document(
    kind: DocumentKind,
    client_name: &str,
    pricing: &PricingResult,
) -> Result<String, Failure> {
    let renderer = TeraDocumentRenderer::with_embedded_templates()
        .map_err(|error| Failure::new("document", EXIT_DOCUMENT, error))?;
    let rendered = match kind {
        DocumentKind::Client => renderer.render_client_quote(client_name, pricing),
        DocumentKind::Internal => {
            renderer.render_internal_breakdown(client_name, &ProfitBreakdown::from_pricing(pricing))
        }
    };
    rendered.map_err(|error| Failure::new("document", EXIT_DOCUMENT, error))
}
