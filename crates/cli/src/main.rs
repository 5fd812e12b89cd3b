use std::process::ExitCode;

use fieldquote_core::config::{AppConfig, LoadOptions};

fn main() -> anyhow::Result<ExitCode> {
    let cli = fieldquote_cli::parse();

    // Commands report configuration failures in their JSON payload.
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        fieldquote_cli::logging::init_logging(&config)?;
    }

    Ok(fieldquote_cli::execute(cli))
}
