use crate::cli::Cli;
use crate::commands::Result;
use crate::output::{format_output, OutputData, PatternInfo};
use studyscribe_core::video_id::patterns;

pub fn run(cli: &Cli) -> Result<()> {
    let patterns = patterns()
        .iter()
        .map(|p| PatternInfo {
            id: p.id.to_string(),
            description: p.description.to_string(),
            example: p.example.to_string(),
        })
        .collect();
    format_output(&OutputData::Patterns(patterns), &cli.output)
}
