use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::margin::{MarginSet, MAX_MARGIN_PCT, MIN_MARGIN_PCT};
use crate::domain::numeric::parse_decimal_text;
use crate::domain::settings::{GlobalSettings, DEFAULT_DAILY_LABOR_RATE};

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["fieldquote.toml", "config/fieldquote.toml"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PricingConfig {
    pub daily_labor_rate: Decimal,
    pub part_margin: Decimal,
    pub labor_margin: Decimal,
    pub extra_margin: Decimal,
    /// Reject estimates containing unit symbols outside the conversion table.
    pub strict_units: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub daily_labor_rate: Option<Decimal>,
    pub strict_units: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let margins = MarginSet::default();
        Self {
            database: DatabaseConfig {
                url: "sqlite://fieldquote.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            pricing: PricingConfig {
                daily_labor_rate: DEFAULT_DAILY_LABOR_RATE,
                part_margin: margins.part_margin,
                labor_margin: margins.labor_margin,
                extra_margin: margins.extra_margin,
                strict_units: false,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options
                .config_path
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The immutable pricing defaults handed to every calculation.
    pub fn global_settings(&self) -> GlobalSettings {
        GlobalSettings::new(
            self.pricing.daily_labor_rate,
            MarginSet::new(
                self.pricing.part_margin,
                self.pricing.labor_margin,
                self.pricing.extra_margin,
            ),
        )
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(daily_labor_rate) = pricing.daily_labor_rate {
                self.pricing.daily_labor_rate = daily_labor_rate;
            }
            if let Some(part_margin) = pricing.part_margin {
                self.pricing.part_margin = part_margin;
            }
            if let Some(labor_margin) = pricing.labor_margin {
                self.pricing.labor_margin = labor_margin;
            }
            if let Some(extra_margin) = pricing.extra_margin {
                self.pricing.extra_margin = extra_margin;
            }
            if let Some(strict_units) = pricing.strict_units {
                self.pricing.strict_units = strict_units;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("FIELDQUOTE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("FIELDQUOTE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("FIELDQUOTE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("FIELDQUOTE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("FIELDQUOTE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("FIELDQUOTE_PRICING_DAILY_LABOR_RATE") {
            self.pricing.daily_labor_rate =
                parse_decimal("FIELDQUOTE_PRICING_DAILY_LABOR_RATE", &value)?;
        }
        if let Some(value) = read_env("FIELDQUOTE_PRICING_PART_MARGIN") {
            self.pricing.part_margin = parse_decimal("FIELDQUOTE_PRICING_PART_MARGIN", &value)?;
        }
        if let Some(value) = read_env("FIELDQUOTE_PRICING_LABOR_MARGIN") {
            self.pricing.labor_margin = parse_decimal("FIELDQUOTE_PRICING_LABOR_MARGIN", &value)?;
        }
        if let Some(value) = read_env("FIELDQUOTE_PRICING_EXTRA_MARGIN") {
            self.pricing.extra_margin = parse_decimal("FIELDQUOTE_PRICING_EXTRA_MARGIN", &value)?;
        }
        if let Some(value) = read_env("FIELDQUOTE_PRICING_STRICT_UNITS") {
            self.pricing.strict_units = parse_bool("FIELDQUOTE_PRICING_STRICT_UNITS", &value)?;
        }

        let log_level =
            read_env("FIELDQUOTE_LOGGING_LEVEL").or_else(|| read_env("FIELDQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("FIELDQUOTE_LOGGING_FORMAT").or_else(|| read_env("FIELDQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(daily_labor_rate) = overrides.daily_labor_rate {
            self.pricing.daily_labor_rate = daily_labor_rate;
        }
        if let Some(strict_units) = overrides.strict_units {
            self.pricing.strict_units = strict_units;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_pricing(&self.pricing)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The config file that `load` would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.daily_labor_rate < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.daily_labor_rate must not be negative".to_string(),
        ));
    }

    for (name, value) in [
        ("part_margin", pricing.part_margin),
        ("labor_margin", pricing.labor_margin),
        ("extra_margin", pricing.extra_margin),
    ] {
        if value < MIN_MARGIN_PCT || value > MAX_MARGIN_PCT {
            return Err(ConfigError::Validation(format!(
                "pricing.{name} must be in range 0..=100, got {value}"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| invalid_override(key, value))
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    parse_decimal_text(value.trim()).ok_or_else(|| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    #[serde(alias = "daily_labor_cost")]
    daily_labor_rate: Option<Decimal>,
    part_margin: Option<Decimal>,
    labor_margin: Option<Decimal>,
    extra_margin: Option<Decimal>,
    strict_units: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::domain::margin::MarginSet;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn missing_path(dir: &TempDir) -> Option<std::path::PathBuf> {
        Some(dir.path().join("absent.toml"))
    }

    #[test]
    fn defaults_match_built_in_pricing() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;

        let config =
            AppConfig::load(LoadOptions { config_path: missing_path(&dir), ..LoadOptions::default() })
                .map_err(|err| format!("config load failed: {err}"))?;
        let settings = config.global_settings();

        ensure(settings.daily_labor_rate == Decimal::new(1000, 0), "daily rate defaults to 1000")?;
        ensure(settings.margins == MarginSet::default(), "margins default to 15/20/5")?;
        ensure(!config.pricing.strict_units, "unit policy defaults to lenient")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "compact logging by default")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_FIELDQUOTE_DB_PATH", "/tmp/from-env.db");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("fieldquote.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://${TEST_FIELDQUOTE_DB_PATH}"

[pricing]
daily_labor_cost = 1200
part_margin = 12.5
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite:///tmp/from-env.db",
                "database url should be interpolated from environment",
            )?;
            ensure(
                config.pricing.daily_labor_rate == Decimal::new(1200, 0),
                "legacy daily_labor_cost key should be accepted",
            )?;
            ensure(
                config.pricing.part_margin == Decimal::new(125, 1),
                "fractional margin should load from file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_FIELDQUOTE_DB_PATH"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FIELDQUOTE_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("FIELDQUOTE_PRICING_LABOR_MARGIN", "25");
        env::set_var("FIELDQUOTE_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("fieldquote.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[pricing]
labor_margin = 30
extra_margin = 8

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.pricing.labor_margin == Decimal::new(25, 0),
                "env labor margin should win over file",
            )?;
            ensure(
                config.pricing.extra_margin == Decimal::new(8, 0),
                "file extra margin should win over default",
            )?;
            ensure(matches!(config.logging.format, LogFormat::Json), "env log format applies")?;
            Ok(())
        })();

        clear_vars(&[
            "FIELDQUOTE_DATABASE_URL",
            "FIELDQUOTE_PRICING_LABOR_MARGIN",
            "FIELDQUOTE_LOG_FORMAT",
        ]);
        result
    }

    #[test]
    fn out_of_range_margin_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FIELDQUOTE_PRICING_PART_MARGIN", "140");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let error = match AppConfig::load(LoadOptions {
                config_path: missing_path(&dir),
                ..LoadOptions::default()
            }) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("pricing.part_margin")
            );
            ensure(has_message, "validation failure should mention pricing.part_margin")
        })();

        clear_vars(&["FIELDQUOTE_PRICING_PART_MARGIN"]);
        result
    }

    #[test]
    fn malformed_env_decimal_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FIELDQUOTE_PRICING_DAILY_LABOR_RATE", "a lot");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let outcome = AppConfig::load(LoadOptions {
                config_path: missing_path(&dir),
                ..LoadOptions::default()
            });
            ensure(
                matches!(outcome, Err(ConfigError::InvalidEnvOverride { ref key, .. })
                    if key == "FIELDQUOTE_PRICING_DAILY_LABOR_RATE"),
                "malformed daily rate should be reported with its key",
            )
        })();

        clear_vars(&["FIELDQUOTE_PRICING_DAILY_LABOR_RATE"]);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;

        let outcome = AppConfig::load(LoadOptions {
            config_path: missing_path(&dir),
            require_file: true,
            ..LoadOptions::default()
        });
        ensure(
            matches!(outcome, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }
}
