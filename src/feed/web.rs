use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::ai::Summarizer;
use crate::error::Result;
use crate::models::SourceType;
use crate::services::ContentFetcher;

use super::{Candidate, Enrichment, SourceAdapter, MAX_RESULTS};

/// Treats a plain page as a listing: every same-host link matching
/// `content_url_pattern` is a candidate.
pub struct WebAdapter {
    fetcher: ContentFetcher,
    summarizer: Arc<dyn Summarizer>,
    content_url_pattern: Regex,
}

impl WebAdapter {
    pub fn new(
        fetcher: ContentFetcher,
        summarizer: Arc<dyn Summarizer>,
        content_url_pattern: Regex,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            content_url_pattern,
        }
    }
}

#[async_trait]
impl SourceAdapter for WebAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::Web
    }

    async fn discover(&self, origin: &str) -> Result<Vec<Candidate>> {
        let base = Url::parse(origin)?;
        let html = self.fetcher.fetch_html(origin).await?;
        Ok(extract_links(&html, &base, &self.content_url_pattern)
            .into_iter()
            .map(Candidate::new)
            .collect())
    }

    async fn enrich(&self, candidate: &Candidate) -> Result<Enrichment> {
        Ok(Enrichment {
            title: self.summarizer.extract_title(&candidate.url).await?,
            description: self.summarizer.summarize_article(&candidate.url).await?,
        })
    }
}

/// Absolute URLs of the page's anchors that stay on `base`'s host and match
/// `pattern`, first occurrence order, without duplicates, at most
/// `MAX_RESULTS`.
pub fn extract_links(html: &str, base: &Url, pattern: &Regex) -> Vec<String> {
    let doc = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    doc.select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| url.host_str() == base.host_str())
        .map(String::from)
        .filter(|url| pattern.is_match(url))
        .filter(|url| seen.insert(url.clone()))
        .take(MAX_RESULTS)
        .collect()
}
