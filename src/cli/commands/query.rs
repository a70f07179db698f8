use anyhow::{Context, Result};
use clap::Args;
use std::time::Instant;
use tracing::debug;

use super::connect;
use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat, QueryResults};
use crate::services::IndexingClient;

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[arg(required = true, help = "Query text")]
    pub query: String,

    #[arg(
        long = "top-k",
        short = 'k',
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Maximum number of matches to return"
    )]
    pub top_k: Option<u32>,
}

pub async fn handle_query(args: QueryArgs, config: &Config, format: OutputFormat) -> Result<()> {
    if args.query.trim().is_empty() {
        anyhow::bail!("query cannot be empty");
    }

    let formatter = get_formatter(format);
    let top_k = args.top_k.unwrap_or(config.search.default_top_k);
    let client = connect(config).await?;

    let results = run_query(&client, args.query, top_k).await?;
    if results.is_empty() && format == OutputFormat::Text {
        eprintln!("No matches found for: {}", results.query);
    }
    print!("{}", formatter.format_query_results(&results));

    Ok(())
}

/// Query with the text exactly as given; surrounding whitespace is embedded too.
pub(crate) async fn run_query(
    client: &IndexingClient,
    query: String,
    top_k: u32,
) -> Result<QueryResults> {
    let start_time = Instant::now();
    let matches = client.query(&query, top_k).await.context("query failed")?;
    let duration_ms = start_time.elapsed().as_millis() as u64;
    debug!(duration_ms, "query timing");

    Ok(QueryResults::new(query, top_k, matches, duration_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{FakeEmbedder, FakeIndex};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_query_text_embedded_verbatim() {
        let embedder = Arc::new(FakeEmbedder::new());
        let client = IndexingClient::new(embedder.clone(), Arc::new(FakeIndex::new()));

        let results = run_query(&client, "  Boston?\n".to_string(), 3).await.unwrap();

        assert_eq!(embedder.calls(), vec![vec!["  Boston?\n".to_string()]]);
        assert_eq!(results.query, "  Boston?\n");
        assert_eq!(results.top_k, 3);
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let args = QueryArgs {
            query: " \t ".to_string(),
            top_k: None,
        };
        let err = handle_query(args, &Config::default(), OutputFormat::Text)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("query cannot be empty"));
    }
}
