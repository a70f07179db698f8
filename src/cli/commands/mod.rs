mod demo;
mod index;
mod query;
mod status;

pub use index::IndexArgs;
pub use query::QueryArgs;

pub use demo::handle_demo;
pub use index::handle_index;
pub use query::handle_query;
pub use status::handle_status;

use anyhow::{Context, Result};

use crate::models::{Config, Credentials};
use crate::services::IndexingClient;

/// Read credentials from the environment and bind both providers.
async fn connect(config: &Config) -> Result<IndexingClient> {
    let credentials = Credentials::from_env(config.vector_store.driver)?;
    IndexingClient::from_config(config, &credentials)
        .await
        .context("failed to initialize providers")
}
