use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "studyscribe_cli=info,studyscribe_core=warn",
        1 => "studyscribe_cli=debug,studyscribe_core=debug",
        _ => "studyscribe_cli=trace,studyscribe_core=trace",
    };
    // Logs go to stderr so piped transcript output stays clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Commands::Transcript { input, lang, lines } => {
            transcript::run(&cli, input, lang.as_deref(), *lines).await
        }
        Commands::Languages { input } => languages::run(&cli, input).await,
        Commands::Params { input, lang } => params::run(&cli, input, lang),
        Commands::Patterns => patterns::run(&cli),
        Commands::Usage { identity } => usage::run(&cli, identity),
        Commands::Config { action } => config::run(&cli, action.clone()),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(e.exit_code());
    }
}
