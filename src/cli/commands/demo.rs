use anyhow::{Context, Result};
use std::time::Instant;

use super::connect;
use crate::cli::output::get_formatter;
use crate::demo::{DEMO_BATCH_SIZE, DEMO_QUERY, DEMO_TOP_K, demo_corpus};
use crate::models::{Config, OutputFormat, QueryResults};
use crate::services::IndexingClient;

pub async fn handle_demo(config: &Config, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let client = connect(config).await?;

    let results = run_demo(&client).await?;
    print!("{}", formatter.format_query_results(&results));

    Ok(())
}

/// Store the demo corpus, then query it for the demo question.
pub(crate) async fn run_demo(client: &IndexingClient) -> Result<QueryResults> {
    client
        .embed_and_store(DEMO_BATCH_SIZE, &demo_corpus())
        .await
        .context("failed to store demo corpus")?;

    let start_time = Instant::now();
    let matches = client
        .query(DEMO_QUERY, DEMO_TOP_K)
        .await
        .context("demo query failed")?;

    Ok(QueryResults::new(
        DEMO_QUERY.to_string(),
        DEMO_TOP_K,
        matches,
        start_time.elapsed().as_millis() as u64,
    ))
}
