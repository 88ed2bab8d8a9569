use crate::cli::{Cli, OutputFormat};
use crate::commands::{spinner, CommandError, Result};
use crate::output::{format_output, OutputData};
use studyscribe_core::service::DEFAULT_TOKEN_BUDGET;
use studyscribe_core::usage::{UsageLedger, TRANSCRIPT_FEATURE};
use studyscribe_core::{EngineConfig, ReqwestTransport, TranscriptEngine, TranscriptError};
use tracing::{debug, warn};

const LOCAL_IDENTITY: &str = "local";

pub async fn run(cli: &Cli, input: &str, lang: Option<&str>, lines: bool) -> Result<()> {
    let config = EngineConfig::load_default()?;
    let engine = TranscriptEngine::new(ReqwestTransport::new()?, config);

    // A broken ledger must not block transcript retrieval from the CLI.
    let ledger = match UsageLedger::new_default() {
        Ok(ledger) => Some(ledger),
        Err(e) => {
            warn!(error = %e, "usage ledger unavailable, not recording usage");
            None
        }
    };
    if let Some(ledger) = &ledger {
        match ledger.is_under_limit(LOCAL_IDENTITY, DEFAULT_TOKEN_BUDGET) {
            Ok(true) => {}
            Ok(false) => return Err(CommandError::Transcript(TranscriptError::QuotaExceeded)),
            Err(e) => warn!(error = %e, "could not read usage ledger, skipping quota check"),
        }
    }

    let progress = (cli.output == OutputFormat::Pretty)
        .then(|| spinner(format!("Fetching transcript for {}...", input)));
    let outcome = engine.fetch(input, lang).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let result = outcome?;

    if let Some(ledger) = &ledger {
        let tokens = result.estimated_tokens();
        match ledger.record_usage(LOCAL_IDENTITY, TRANSCRIPT_FEATURE, 0, tokens) {
            Ok(()) => debug!(tokens, "recorded usage"),
            Err(e) => warn!(error = %e, "could not record usage"),
        }
    }

    format_output(&OutputData::Transcript { result, lines }, &cli.output)
}
