use crate::cli::Cli;
use crate::commands::Result;
use crate::output::{format_output, OutputData};
use serde_json::json;
use studyscribe_core::usage::UsageLedger;

pub fn run(cli: &Cli, identity: &str) -> Result<()> {
    let ledger = UsageLedger::new_default()?;
    let summary = ledger.summarize(identity)?;
    let this_month = ledger.monthly_total(identity)?;

    let report = json!({
        "identity": identity,
        "monthly_limit": ledger.monthly_token_limit,
        "this_month": this_month,
        "remaining": ledger.monthly_token_limit.saturating_sub(this_month),
        "totals": summary,
    });
    format_output(&OutputData::UsageReport(report), &cli.output)
}
