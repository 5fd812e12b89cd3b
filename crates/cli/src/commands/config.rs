use std::env;
use std::fs;
use std::path::Path;

use serde::Serialize;
use toml::Value;

use fieldquote_core::config::resolve_config_path;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "config";

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct ConfigPayload {
    precedence: &'static str,
    entries: Vec<ConfigEntry>,
}

pub fn run() -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let fields: [(&'static str, &'static str, String); 12] = [
        ("database.url", "FIELDQUOTE_DATABASE_URL", config.database.url.clone()),
        (
            "database.max_connections",
            "FIELDQUOTE_DATABASE_MAX_CONNECTIONS",
            config.database.max_connections.to_string(),
        ),
        (
            "database.timeout_secs",
            "FIELDQUOTE_DATABASE_TIMEOUT_SECS",
            config.database.timeout_secs.to_string(),
        ),
        (
            "pricing.daily_labor_rate",
            "FIELDQUOTE_PRICING_DAILY_LABOR_RATE",
            config.pricing.daily_labor_rate.to_string(),
        ),
        (
            "pricing.part_margin",
            "FIELDQUOTE_PRICING_PART_MARGIN",
            config.pricing.part_margin.to_string(),
        ),
        (
            "pricing.labor_margin",
            "FIELDQUOTE_PRICING_LABOR_MARGIN",
            config.pricing.labor_margin.to_string(),
        ),
        (
            "pricing.extra_margin",
            "FIELDQUOTE_PRICING_EXTRA_MARGIN",
            config.pricing.extra_margin.to_string(),
        ),
        (
            "pricing.strict_units",
            "FIELDQUOTE_PRICING_STRICT_UNITS",
            config.pricing.strict_units.to_string(),
        ),
        ("logging.level", "FIELDQUOTE_LOGGING_LEVEL", config.logging.level.clone()),
        (
            "logging.format",
            "FIELDQUOTE_LOGGING_FORMAT",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
        ),
        (
            "pricing.margin_multiplier",
            "",
            config.global_settings().margins.multiplier().to_string(),
        ),
        (
            "pricing.gross_margin_pct",
            "",
            config.global_settings().margins.gross_margin_pct().round_dp(2).to_string(),
        ),
    ];

    let entries = fields
        .into_iter()
        .map(|(key, env_key, value)| {
            let source = if env_key.is_empty() { "derived".to_string() } else { source(key, env_key) };
            ConfigEntry { key, value, source }
        })
        .collect();

    CommandResult::success_with(
        COMMAND,
        &ConfigPayload { precedence: "env > file > default", entries },
    )
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
