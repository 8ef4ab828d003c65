//! Main entry point for the binpeek CLI application.
//!
//! Loads a local file or a remote URL into memory, picks a decoder from the
//! leading bytes (or `--format`) and prints the structure report.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::Path;

use binpeek::{
    Cli, Collaborators, Format, HttpRangeReader, LocalFileReader, ReadAt, WikiLinker, inspect,
    read_prefix,
};

/// Application entry point.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let data = if cli.is_http_url() {
        let reader = HttpRangeReader::new(cli.file.clone()).await?;
        let data = load(&reader, cli.max_bytes).await?;
        log::info!("{} bytes transferred", reader.transferred_bytes());
        data
    } else {
        let reader = LocalFileReader::new(Path::new(&cli.file))?;
        load(&reader, cli.max_bytes).await?
    };

    let format = match cli.format.or_else(|| Format::sniff(&data)) {
        Some(format) => format,
        None => bail!("{}: not an MP3 or ZIP file (use --format to force one)", cli.file),
    };

    let mut collab = Collaborators::default().with_preview(|uri: &str| {
        log::info!("preview image available ({} byte data URI)", uri.len());
    });
    if cli.wiki_links {
        collab = collab.with_linker(WikiLinker::default());
    }

    let decoded = inspect(&data, format, &collab);

    if cli.json {
        println!("{}", decoded.report.to_json_pretty()?);
    } else {
        print!("{}", decoded.report);
    }

    if let Some(err) = decoded.status.error() {
        eprintln!("\n{}: report is partial: {}", cli.file, err);
    }

    Ok(())
}

/// Read the bytes to inspect, honouring the `--max-bytes` budget.
async fn load<R: ReadAt>(reader: &R, max_bytes: Option<u64>) -> Result<Vec<u8>> {
    if reader.size() == 0 {
        bail!("file is empty");
    }
    read_prefix(reader, max_bytes).await
}
