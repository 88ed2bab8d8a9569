use crate::cli::{Cli, OutputFormat};
use crate::commands::{spinner, Result};
use crate::output::{format_output, OutputData};
use studyscribe_core::{EngineConfig, ReqwestTransport, TranscriptEngine, VideoId};

pub async fn run(cli: &Cli, input: &str) -> Result<()> {
    let video_id = VideoId::parse(input)?;
    let engine = TranscriptEngine::new(ReqwestTransport::new()?, EngineConfig::load_default()?);

    let progress = (cli.output == OutputFormat::Pretty)
        .then(|| spinner(format!("Reading watch page for {}...", video_id)));
    let page = engine.watch_page(&video_id).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let page = page?;

    format_output(
        &OutputData::Languages {
            video_id,
            metadata: page.metadata,
            tracks: page.languages,
        },
        &cli.output,
    )
}
