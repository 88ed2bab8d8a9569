use crate::cli::OutputFormat;
use crate::commands::Result;
use serde::Serialize;
use serde_json::Value;
use studyscribe_core::youtube::LanguageTrack;
use studyscribe_core::{TranscriptResult, VideoId, VideoMetadata};

mod pretty;
pub use pretty::format_pretty;

#[derive(Debug, Clone, Serialize)]
pub struct PatternInfo {
    pub id: String,
    pub description: String,
    pub example: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    Transcript {
        result: TranscriptResult,
        /// One cue per line instead of joined text (text and pretty only).
        #[serde(skip)]
        lines: bool,
    },
    Languages {
        video_id: VideoId,
        metadata: VideoMetadata,
        tracks: Vec<LanguageTrack>,
    },
    Params {
        video_id: VideoId,
        language: String,
        params: String,
    },
    Patterns(Vec<PatternInfo>),
    UsageReport(Value),
    ConfigInfo(Value),
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text => {
            format_text_output(data)?;
        }
        OutputFormat::Pretty => {
            format_pretty_output(data)?;
        }
    }
    Ok(())
}

fn transcript_body(result: &TranscriptResult, lines: bool) -> String {
    if lines {
        result.lines.join("\n")
    } else {
        result.joined()
    }
}

fn format_text_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::Transcript { result, lines } => {
            println!("{}", transcript_body(result, *lines));
        }
        OutputData::Languages { tracks, .. } => {
            for track in tracks {
                println!(
                    "{}\t{}\t{}",
                    track.language_code,
                    track.name,
                    track.kind.as_deref().unwrap_or("")
                );
            }
        }
        OutputData::Params { params, .. } => {
            println!("{}", params);
        }
        OutputData::Patterns(patterns) => {
            for p in patterns {
                println!("{}\t{}\t{}", p.id, p.example, p.description);
            }
        }
        OutputData::UsageReport(report) | OutputData::ConfigInfo(report) => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

fn format_pretty_output(data: &OutputData) -> Result<()> {
    use owo_colors::OwoColorize;

    match data {
        OutputData::Transcript { result, lines } => {
            println!();
            if !result.metadata.title.is_empty() {
                println!("{}", result.metadata.title.bold().cyan());
            }
            println!(
                "{} {} {} {} {} {}",
                "Video:".dimmed(),
                result.video_id.green(),
                "Author:".dimmed(),
                result.metadata.author,
                "Language:".dimmed(),
                result.language.yellow()
            );
            println!();
            println!("{}", transcript_body(result, *lines));
            println!();
            println!(
                "{}",
                format!(
                    "{} lines, ~{} tokens",
                    result.lines.len(),
                    result.estimated_tokens()
                )
                .dimmed()
            );
        }
        OutputData::Languages {
            video_id,
            metadata,
            tracks,
        } => {
            println!();
            println!(
                "{} {} {}",
                "Caption tracks for".dimmed(),
                video_id.green().bold(),
                metadata.title.cyan()
            );
            println!();
            if tracks.is_empty() {
                println!("{}", "No caption tracks advertised on the watch page.".yellow());
            }
            for track in tracks {
                let kind = if track.is_generated() {
                    "auto-generated".dimmed().to_string()
                } else {
                    "manual".green().to_string()
                };
                println!(
                    "  {:<8} {}  {}",
                    track.language_code.bold(),
                    track.name,
                    kind
                );
            }
            println!();
        }
        OutputData::Params {
            video_id,
            language,
            params,
        } => {
            println!(
                "{} {} {} {}",
                "Params for".dimmed(),
                video_id.green().bold(),
                "language".dimmed(),
                language.yellow()
            );
            println!("{}", params);
        }
        OutputData::Patterns(patterns) => {
            println!();
            println!("{}", "Accepted Inputs".bold().cyan());
            println!();
            for p in patterns {
                println!("  {} {}", p.id.green().bold(), p.description);
                println!("    {}", p.example.dimmed());
            }
            println!();
        }
        OutputData::UsageReport(report) => {
            println!("{}", "Usage".bold().cyan());
            println!();
            println!("{}", format_pretty(report));
        }
        OutputData::ConfigInfo(config) => {
            println!("{}", format_pretty(config));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_json_hides_display_flag() {
        let data = OutputData::Transcript {
            result: TranscriptResult {
                video_id: VideoId::parse("dQw4w9WgXcQ").unwrap(),
                language: "en".to_string(),
                lines: vec!["Hello".to_string(), "world".to_string()],
                metadata: VideoMetadata::default(),
            },
            lines: true,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["type"], "Transcript");
        assert_eq!(value["data"]["result"]["video_id"], "dQw4w9WgXcQ");
        assert_eq!(value["data"]["result"]["lines"][1], "world");
        assert!(value["data"].get("lines").is_none());
    }

    #[test]
    fn test_transcript_body_modes() {
        let result = TranscriptResult {
            video_id: VideoId::parse("dQw4w9WgXcQ").unwrap(),
            language: "en".to_string(),
            lines: vec!["a".to_string(), "b".to_string()],
            metadata: VideoMetadata::default(),
        };
        assert_eq!(transcript_body(&result, false), "a b");
        assert_eq!(transcript_body(&result, true), "a\nb");
    }
}
