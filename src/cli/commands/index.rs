//! Index command implementation.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use super::connect;
use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// File with one text per line (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Texts per embedding request and upsert
    #[arg(long, short = 'b', value_parser = clap::value_parser!(u32).range(1..))]
    pub batch_size: Option<u32>,

    /// Skip texts before this offset, e.g. to resume a failed run
    #[arg(long, default_value_t = 0)]
    pub start_offset: usize,
}

pub async fn handle_index(args: IndexArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);

    let texts = match args.file {
        Some(ref path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            read_corpus(BufReader::new(file))?
        }
        None => read_corpus(io::stdin().lock())?,
    };

    if texts.is_empty() {
        print!("{}", formatter.format_message("No texts found to index."));
        return Ok(());
    }

    let batch_size = args.batch_size.unwrap_or(config.indexing.batch_size) as usize;
    let client = connect(config).await?;

    let remaining = texts.len().saturating_sub(args.start_offset) as u64;
    let pb = if format == OutputFormat::Text {
        ProgressBar::new(remaining)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let result = client
        .embed_and_store_from(args.start_offset, batch_size, &texts, |window| {
            pb.inc(window.len() as u64);
        })
        .await;
    pb.finish_and_clear();

    match result {
        Ok(report) => {
            print!("{}", formatter.format_store_report(&report));
            Ok(())
        }
        Err(err) => {
            if let Some(offset) = err.next_offset() {
                eprintln!("Hint: rerun with --start-offset {offset} to resume.");
            }
            Err(err).context("indexing failed")
        }
    }
}

/// One text per non-blank line, kept verbatim apart from the line terminator.
fn read_corpus(reader: impl BufRead) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for line in reader.lines() {
        let line = line.context("failed to read input")?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if !line.trim().is_empty() {
            texts.push(line.to_string());
        }
    }
    Ok(texts)
}
