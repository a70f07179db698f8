//! CLI module for the embed-and-query tool.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Embed text into a vector index and query it by meaning.
///
/// Runs the demonstration corpus when no subcommand is given.
#[derive(Debug, Parser)]
#[command(name = "opstack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, short = 'f', global = true, help = "Output format: text or json")]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        long,
        short = 'c',
        global = true,
        env = "OPSTACK_CONFIG",
        help = "Path to a config file (defaults to the user config directory)"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Embed the demonstration corpus and run the demonstration query
    Demo,

    /// Embed and store one text per line of a file or stdin
    Index(commands::IndexArgs),

    /// Query the index with free text
    Query(commands::QueryArgs),

    /// Show the bound index and its vector count
    Status,
}
