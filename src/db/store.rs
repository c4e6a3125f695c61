use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ContentItem, Source};

/// Upper bound on records per write call.
pub const MAX_BATCH_SIZE: usize = 25;

/// Key-value storage keyed by (partition, sort).
#[async_trait]
pub trait Store: Send + Sync {
    /// Every record under the `source` partition.
    async fn load_sources(&self) -> Result<Vec<Source>>;

    async fn item_exists(&self, partition: &str, sort: &str) -> Result<bool>;

    /// One underlying write call. Callers keep `items.len() <= MAX_BATCH_SIZE`.
    async fn write_batch(&self, items: &[ContentItem]) -> Result<()>;

    /// Like `load_sources`, but a failure is logged and reported as `None`.
    async fn query_sources(&self) -> Option<Vec<Source>> {
        tracing::info!("Querying store for sources");
        match self.load_sources().await {
            Ok(sources) => {
                tracing::info!("Retrieved {} source(s)", sources.len());
                Some(sources)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to query sources");
                None
            }
        }
    }

    /// Writes `items` in batches of at most `MAX_BATCH_SIZE`. A failing batch
    /// is logged and the remaining batches are still attempted.
    ///
    /// Returns the number of items in batches that were written.
    async fn insert_content(&self, items: &[ContentItem]) -> usize {
        let mut written = 0;
        for chunk in items.chunks(MAX_BATCH_SIZE) {
            tracing::info!("Writing batch of {} items", chunk.len());
            match self.write_batch(chunk).await {
                Ok(()) => written += chunk.len(),
                Err(e) => {
                    let keys: Vec<&str> = chunk.iter().map(|i| i.key.as_str()).collect();
                    tracing::error!(error = %e, ?keys, "Failed to write batch");
                }
            }
        }
        written
    }
}
