use crate::cli::Cli;
use crate::commands::Result;
use crate::output::{format_output, OutputData};
use studyscribe_core::youtube::TranscriptRequest;
use studyscribe_core::VideoId;

pub fn run(cli: &Cli, input: &str, lang: &str) -> Result<()> {
    let video_id = VideoId::parse(input)?;
    let params = TranscriptRequest::new(video_id.clone(), lang).encode_params();
    format_output(
        &OutputData::Params {
            video_id,
            language: lang.to_string(),
            params,
        },
        &cli.output,
    )
}
