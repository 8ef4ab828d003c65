use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::format::Format;

#[derive(Parser, Debug)]
#[command(name = "binpeek")]
#[command(version)]
#[command(about = "Show the internal structure of MP3 (ID3v2) and ZIP-family files", long_about = None)]
#[command(after_help = "Examples:\n  \
  binpeek song.mp3                       list ID3 frames and embedded pictures\n  \
  binpeek --json report.docx             print the ZIP record walk as JSON\n  \
  binpeek -m 65536 https://example.com/big.mp3   inspect only the first 64 KiB")]
pub struct Cli {
    /// File path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Container format (default: detect from magic bytes)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<Format>,

    /// Load at most this many bytes from the start of the file
    #[arg(short = 'm', long, value_name = "BYTES")]
    pub max_bytes: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Link artist and album fields to Wikipedia
    #[arg(short = 'w', long)]
    pub wiki_links: bool,

    /// More log output (-vv for trace)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (-qq => errors only)
    #[arg(short = 'q', action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    /// Log level selected by `-v` / `-q`, starting from `warn`.
    pub fn log_level(&self) -> LevelFilter {
        match (self.verbose, self.quiet) {
            (0, 0) => LevelFilter::Warn,
            (0, 1) => LevelFilter::Error,
            (0, _) => LevelFilter::Off,
            (1, _) => LevelFilter::Info,
            (2, _) => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_options() {
        let cli = Cli::parse_from(["binpeek", "-f", "zip", "-m", "1024", "--json", "-vv", "a.docx"]);
        assert_eq!(cli.format, Some(Format::Zip));
        assert_eq!(cli.max_bytes, Some(1024));
        assert!(cli.json);
        assert!(!cli.is_http_url());
        assert_eq!(cli.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn quiet_levels() {
        assert_eq!(Cli::parse_from(["binpeek", "x"]).log_level(), LevelFilter::Warn);
        assert_eq!(Cli::parse_from(["binpeek", "-q", "x"]).log_level(), LevelFilter::Error);
        assert_eq!(Cli::parse_from(["binpeek", "-qq", "x"]).log_level(), LevelFilter::Off);
        assert!(Cli::try_parse_from(["binpeek", "-q", "-v", "x"]).is_err());
    }

    #[test]
    fn detects_urls() {
        assert!(Cli::parse_from(["binpeek", "https://example.com/a.mp3"]).is_http_url());
    }
}
