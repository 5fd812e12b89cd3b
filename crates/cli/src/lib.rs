pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::quote::QuoteArgs;
use commands::record::RecordArgs;

#[derive(Debug, Parser)]
#[command(
    name = "fieldquote",
    about = "Field-services estimate pricing CLI",
    long_about = "Price draft estimates offline or from the estimate store, and report profit and loss over finished jobs.",
    after_help = "Examples:\n  fieldquote quote --estimate draft.json --document client\n  fieldquote record C-1042\n  fieldquote pnl"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price an estimate record file offline using configured settings")]
    Quote(QuoteArgs),
    #[command(about = "Reprice a stored client job with stored settings and stock levels")]
    Record(RecordArgs),
    #[command(about = "Compute profit and loss over finished jobs and logged purchases")]
    Pnl,
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn execute(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Quote(args) => commands::quote::run(&args),
        Command::Record(args) => commands::record::run(&args),
        Command::Pnl => commands::pnl::run(),
        Command::Migrate => commands::migrate::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

pub fn run() -> ExitCode {
    execute(parse())
}
