use std::sync::Arc;

use futures::stream::{self, StreamExt};
use regex::Regex;

use crate::ai::Summarizer;
use crate::config::Config;
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::feed::{self, RssAdapter, SourceAdapter, WebAdapter, YoutubeAdapter, YOUTUBE_SEARCH_URL};
use crate::models::{Source, SourceType};
use crate::services::ContentFetcher;

/// One crawl pass over every configured source.
pub struct Crawler {
    store: Arc<dyn Store>,
    summarizer: Arc<dyn Summarizer>,
    fetcher: ContentFetcher,
    youtube_api_key: Option<String>,
    youtube_search_url: String,
    max_concurrent_sources: usize,
}

impl Crawler {
    pub fn new(
        store: Arc<dyn Store>,
        summarizer: Arc<dyn Summarizer>,
        fetcher: ContentFetcher,
        config: &Config,
    ) -> Self {
        Self {
            store,
            summarizer,
            fetcher,
            youtube_api_key: config.youtube_api_key.clone(),
            youtube_search_url: YOUTUBE_SEARCH_URL.to_string(),
            max_concurrent_sources: config.max_concurrent_sources.max(1),
        }
    }

    #[cfg(test)]
    fn with_youtube_search_url(mut self, url: impl Into<String>) -> Self {
        self.youtube_search_url = url.into();
        self
    }

    /// Refreshes all sources concurrently and returns once every source has
    /// finished. Per-source failures are logged, never returned.
    pub async fn run_once(&self) {
        let Some(sources) = self.store.query_sources().await else {
            tracing::error!("Could not retrieve sources, aborting run");
            return;
        };

        let total = sources.len();
        stream::iter(sources)
            .map(|source| async move { self.refresh_source(&source).await })
            .buffer_unordered(self.max_concurrent_sources)
            .collect::<Vec<()>>()
            .await;

        tracing::info!("Crawl finished for {} source(s)", total);
    }

    async fn refresh_source(&self, source: &Source) {
        match self.adapter_for(source) {
            Ok(adapter) => {
                feed::refresh(adapter.as_ref(), self.store.as_ref(), &source.key).await;
            }
            Err(e) => {
                tracing::error!(source = %source.key, error = %e, "Skipping source");
            }
        }
    }

    /// Builds the adapter for `source`, checking the per-type settings it
    /// needs.
    pub fn adapter_for(&self, source: &Source) -> Result<Box<dyn SourceAdapter>> {
        let fetcher = self.fetcher.clone();
        let summarizer = self.summarizer.clone();

        Ok(match source.source_type {
            SourceType::Rss => Box::new(RssAdapter::new(fetcher, summarizer)),
            SourceType::Web => {
                let pattern = source.content_url_pattern.as_deref().ok_or_else(|| {
                    AppError::InvalidSource("web source has no content_url_pattern".to_string())
                })?;
                Box::new(WebAdapter::new(fetcher, summarizer, Regex::new(pattern)?))
            }
            SourceType::Youtube => {
                let api_key = self.youtube_api_key.clone().ok_or_else(|| {
                    AppError::Config("YOUTUBE_API_KEY is not set".to_string())
                })?;
                Box::new(
                    YoutubeAdapter::new(fetcher, summarizer, api_key)
                        .with_search_url(self.youtube_search_url.clone()),
                )
            }
        })
    }
}
