use crate::cli::{Cli, ConfigAction, OutputFormat};
use crate::commands::Result;
use crate::output::{format_output, OutputData};
use owo_colors::OwoColorize;
use serde_json::json;
use studyscribe_core::config::{default_config_path, CONFIG_ENV_VAR};
use studyscribe_core::EngineConfig;

pub fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_path(cli),
    }
}

fn config_location() -> (Option<String>, &'static str) {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return (Some(path), "environment");
    }
    match default_config_path() {
        Some(path) if path.exists() => (Some(path.display().to_string()), "file"),
        Some(path) => (Some(path.display().to_string()), "defaults"),
        None => (None, "defaults"),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = EngineConfig::load_default()?;
    let (path, source) = config_location();

    if cli.output == OutputFormat::Pretty {
        println!();
        println!("{}", "StudyScribe Configuration".bold().cyan());
        println!("{}", "=========================".cyan());
        println!();
        match &path {
            Some(p) => println!("Config file: {} ({})", p.dimmed(), source),
            None => println!("Config file: {}", "none".dimmed()),
        }
        println!();
    }

    let data = OutputData::ConfigInfo(json!({
        "path": path,
        "source": source,
        "config": serde_json::to_value(&config)?,
        "android_user_agent": config.android_user_agent(),
    }));
    format_output(&data, &cli.output)
}

fn show_path(cli: &Cli) -> Result<()> {
    let (path, source) = config_location();
    match cli.output {
        OutputFormat::Pretty | OutputFormat::Text => {
            match path {
                Some(p) => println!("{}", p),
                None => println!("(no configuration directory on this platform)"),
            }
            Ok(())
        }
        _ => format_output(
            &OutputData::ConfigInfo(json!({ "path": path, "source": source })),
            &cli.output,
        ),
    }
}
