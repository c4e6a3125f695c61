use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

use crate::ai::Summarizer;
use crate::error::{AppError, Result};
use crate::models::SourceType;
use crate::services::ContentFetcher;

use super::{Candidate, Enrichment, SourceAdapter, MAX_RESULTS};

pub const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

const CHANNEL_ID_PREFIX: &str = "UC";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<String>,
}

pub struct YoutubeAdapter {
    fetcher: ContentFetcher,
    summarizer: Arc<dyn Summarizer>,
    api_key: String,
    search_url: String,
}

impl YoutubeAdapter {
    pub fn new(fetcher: ContentFetcher, summarizer: Arc<dyn Summarizer>, api_key: String) -> Self {
        Self {
            fetcher,
            summarizer,
            api_key,
            search_url: YOUTUBE_SEARCH_URL.to_string(),
        }
    }

    pub fn with_search_url(mut self, search_url: impl Into<String>) -> Self {
        self.search_url = search_url.into();
        self
    }

    /// The channel's most recent uploads, newest first.
    async fn latest_videos(&self, channel_id: &str) -> Result<Vec<Candidate>> {
        let max_results = MAX_RESULTS.to_string();
        let response = self
            .fetcher
            .client()
            .get(&self.search_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("channelId", channel_id),
                ("part", "snippet,id"),
                ("order", "date"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AppError::YoutubeApi(format!("{}: {}", status, error_text)));
        }

        let search: SearchResponse = response.json().await?;

        Ok(search
            .items
            .into_iter()
            .filter_map(|item| {
                // search also returns playlists and channels
                let video_id = item.id.video_id?;
                Some(Candidate {
                    url: format!("https://www.youtube.com/watch?v={}", video_id),
                    title: Some(item.snippet.title),
                    description: Some(item.snippet.description),
                    published_at: item
                        .snippet
                        .published_at
                        .as_deref()
                        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                        .map(|dt| dt.timestamp_millis()),
                })
            })
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for YoutubeAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::Youtube
    }

    async fn discover(&self, origin: &str) -> Result<Vec<Candidate>> {
        let html = self.fetcher.fetch_html(origin).await?;
        let channel_id = channel_id_from_page(&html)?;
        tracing::info!("Found channel id: {}", channel_id);
        self.latest_videos(&channel_id).await
    }

    async fn enrich(&self, candidate: &Candidate) -> Result<Enrichment> {
        let title = candidate.title.clone().unwrap_or_default();
        let description = self
            .summarizer
            .summarize_video(&title, candidate.description.as_deref().unwrap_or_default())
            .await?;
        Ok(Enrichment { title, description })
    }
}

/// Reads the canonical channel id from a channel page's `og:url`
/// (`https://www.youtube.com/channel/<id>`). Handle URLs such as
/// `/@name` cannot be passed to the Data API directly.
pub fn channel_id_from_page(html: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    let og_url = Selector::parse(r#"meta[property="og:url"]"#).unwrap();

    let content = doc
        .select(&og_url)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .ok_or_else(|| AppError::ChannelLookup("unable to find the og:url meta tag".into()))?;

    let url = Url::parse(content)
        .map_err(|e| AppError::ChannelLookup(format!("invalid og:url '{}': {}", content, e)))?;

    let channel_id = url
        .path_segments()
        .and_then(|mut segments| segments.nth(1))
        .unwrap_or_default();

    if !channel_id.starts_with(CHANNEL_ID_PREFIX) {
        return Err(AppError::ChannelLookup(format!(
            "could not find a valid channel id, found '{}'",
            channel_id
        )));
    }

    Ok(channel_id.to_string())
}
