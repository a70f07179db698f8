use anyhow::Result;
use tracing::warn;

use super::connect;
use crate::cli::output::{StatusInfo, get_formatter};
use crate::models::{Config, OutputFormat, VectorDriver};

pub async fn handle_status(config: &Config, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let client = connect(config).await?;
    let index = client.index();

    let (connected, stats) = match index.stats().await {
        Ok(stats) => (true, stats),
        Err(e) => {
            warn!(error = %e, "index stats unavailable");
            (false, Default::default())
        }
    };

    let status = StatusInfo {
        driver: config.vector_store.driver.to_string(),
        index: index.index_name().to_string(),
        location: index.location().to_string(),
        embedding_model: client.embedder().model().to_string(),
        connected,
        total_vectors: stats.total_vectors,
        dimension: stats.dimension,
    };

    print!("{}", formatter.format_status(&status));

    if !connected {
        eprintln!();
        match config.vector_store.driver {
            VectorDriver::Pinecone => eprintln!(
                "Warning: Pinecone index '{}' not reachable. Check PINECONE_API_KEY and the environment.",
                status.index
            ),
            VectorDriver::Qdrant => {
                eprintln!("Warning: Qdrant not running. Start with: docker run -p 6334:6334 qdrant/qdrant")
            }
        }
    }

    Ok(())
}
