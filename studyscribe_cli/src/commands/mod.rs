pub mod config;
pub mod languages;
pub mod params;
pub mod patterns;
pub mod transcript;
pub mod usage;

use indicatif::{ProgressBar, ProgressStyle};
use studyscribe_core::TranscriptError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error("Usage ledger error: {0}")]
    Usage(#[from] studyscribe_core::usage::UsageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CommandError {
    /// Process exit status: 2 for bad input, 3 for timeouts, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Transcript(TranscriptError::InvalidVideoIdentifier(_)) => 2,
            CommandError::Transcript(e) if e.is_timeout() => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

pub(crate) fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
