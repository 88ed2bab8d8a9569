use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "studyscribe")]
#[command(about = "StudyScribe - fetch YouTube transcripts from the command line")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  studyscribe transcript dQw4w9WgXcQ           Print the transcript
  studyscribe transcript <url> --lang de       Ask for German captions
  studyscribe languages <url>                  Show advertised caption tracks
  studyscribe patterns                         Show accepted input forms

\x1b[1;36mMore Info:\x1b[0m
  studyscribe <command> --help                 Get help for any command")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the transcript of a video
    ///
    /// Accepts a watch URL, a youtu.be link, an embed/shorts/live URL or a
    /// bare 11-character video id.
    #[command(alias = "t")]
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  studyscribe transcript https://youtu.be/dQw4w9WgXcQ
  studyscribe transcript dQw4w9WgXcQ --lang fr
  studyscribe transcript dQw4w9WgXcQ --lines --output text")]
    Transcript {
        /// Video URL or id
        input: String,
        /// Preferred caption language (falls back to English, then the first track)
        #[arg(short, long)]
        lang: Option<String>,
        /// Print one caption cue per line instead of joined text
        #[arg(long)]
        lines: bool,
    },

    /// List caption tracks advertised on the watch page
    Languages {
        /// Video URL or id
        input: String,
    },

    /// Print the encoded get_transcript params without any network I/O
    Params {
        /// Video URL or id
        input: String,
        /// Caption language to encode
        #[arg(short, long, default_value = "en")]
        lang: String,
    },

    /// Show the accepted video URL and id forms
    Patterns,

    /// Show locally recorded transcript usage
    Usage {
        /// Caller identity to report on
        #[arg(long, default_value = "local")]
        identity: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the configuration file location
    Path,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transcript_flags() {
        let cli = Cli::parse_from([
            "studyscribe",
            "transcript",
            "dQw4w9WgXcQ",
            "--lang",
            "de",
            "--lines",
            "--output",
            "json",
            "-vv",
        ]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Transcript { input, lang, lines } => {
                assert_eq!(input, "dQw4w9WgXcQ");
                assert_eq!(lang.as_deref(), Some("de"));
                assert!(lines);
            }
            _ => panic!("expected transcript command"),
        }
    }

    #[test]
    fn test_params_default_language() {
        let cli = Cli::parse_from(["studyscribe", "params", "dQw4w9WgXcQ"]);
        match cli.command {
            Commands::Params { lang, .. } => assert_eq!(lang, "en"),
            _ => panic!("expected params command"),
        }
    }
}
