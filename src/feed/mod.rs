//! Source adapters and the refresh pipeline they share.

mod rss;
mod web;
mod youtube;

use async_trait::async_trait;

use crate::db::Store;
use crate::error::Result;
use crate::models::{now_millis, ContentItem, SourceDescriptor, SourceType, CONTENT_PARTITION};

pub use rss::RssAdapter;
pub use web::WebAdapter;
pub use youtube::{YoutubeAdapter, YOUTUBE_SEARCH_URL};

/// Candidates considered per source and run.
pub const MAX_RESULTS: usize = 5;

/// An item found during discovery, not yet known to be new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Publish time reported by the source, in milliseconds.
    pub published_at: Option<i64>,
}

impl Candidate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            description: None,
            published_at: None,
        }
    }
}

/// Title and summary generated for a new candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub title: String,
    pub description: String,
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source_type(&self) -> SourceType;

    /// Candidates at `origin`, most relevant first.
    async fn discover(&self, origin: &str) -> Result<Vec<Candidate>>;

    async fn enrich(&self, candidate: &Candidate) -> Result<Enrichment>;
}

/// Runs one adapter against one source key and stores whatever is new.
///
/// Never fails: every error is logged here. Returns the number of items
/// written.
pub async fn refresh(adapter: &dyn SourceAdapter, store: &dyn Store, source_key: &str) -> usize {
    tracing::info!("Refreshing {} source: {}", adapter.source_type(), source_key);

    match try_refresh(adapter, store, source_key).await {
        Ok(written) => written,
        Err(e) => {
            tracing::error!(source = source_key, error = %e, "Failed to refresh source");
            0
        }
    }
}

async fn try_refresh(adapter: &dyn SourceAdapter, store: &dyn Store, source_key: &str) -> Result<usize> {
    let descriptor = SourceDescriptor::parse(source_key)?;

    let mut candidates = adapter.discover(&descriptor.origin).await?;
    candidates.truncate(MAX_RESULTS);

    let discovered_at = now_millis();
    let mut new_items = Vec::new();

    for candidate in candidates {
        let key = descriptor.item_key(&candidate.url);
        if store.item_exists(CONTENT_PARTITION, &key).await? {
            tracing::debug!(key = %key, "Already stored");
            continue;
        }

        match adapter.enrich(&candidate).await {
            Ok(enrichment) => new_items.push(ContentItem {
                key,
                source_type: adapter.source_type(),
                title: enrichment.title,
                description: enrichment.description,
                unix_time: candidate.published_at.unwrap_or(discovered_at),
            }),
            Err(e) => {
                tracing::warn!(url = %candidate.url, error = %e, "Skipping item, enrichment failed");
            }
        }
    }

    tracing::info!(source = source_key, "Found {} new items", new_items.len());
    if new_items.is_empty() {
        return Ok(0);
    }

    Ok(store.insert_content(&new_items).await)
}
