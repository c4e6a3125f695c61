use std::sync::Arc;

use async_trait::async_trait;
use feed_rs::model::Link;
use feed_rs::parser;

use crate::ai::Summarizer;
use crate::error::Result;
use crate::models::SourceType;
use crate::services::ContentFetcher;

use super::{Candidate, Enrichment, SourceAdapter};

const UNTITLED: &str = "-";

pub struct RssAdapter {
    fetcher: ContentFetcher,
    summarizer: Arc<dyn Summarizer>,
}

impl RssAdapter {
    pub fn new(fetcher: ContentFetcher, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            fetcher,
            summarizer,
        }
    }
}

#[async_trait]
impl SourceAdapter for RssAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::Rss
    }

    async fn discover(&self, origin: &str) -> Result<Vec<Candidate>> {
        let bytes = self.fetcher.fetch_bytes(origin).await?;
        parse_feed(&bytes)
    }

    async fn enrich(&self, candidate: &Candidate) -> Result<Enrichment> {
        Ok(Enrichment {
            title: candidate.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
            description: self.summarizer.summarize_article(&candidate.url).await?,
        })
    }
}

/// Entries of an RSS, Atom or JSON feed in feed order. Entries without a
/// link are dropped.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Candidate>> {
    let feed = parser::parse(bytes)?;
    tracing::info!(
        "Received {} entries from: {}",
        feed.entries.len(),
        feed.title.as_ref().map(|t| t.content.as_str()).unwrap_or(UNTITLED)
    );

    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry_link(&entry.links)?;
            Some(Candidate {
                url,
                title: Some(
                    entry
                        .title
                        .map(|t| t.content)
                        .unwrap_or_else(|| UNTITLED.to_string()),
                ),
                description: entry.summary.map(|s| s.content),
                published_at: entry.published.or(entry.updated).map(|dt| dt.timestamp_millis()),
            })
        })
        .collect())
}

/// The entry's `alternate` link (or one without `rel`), else its first link.
/// Atom entries often list `replies` and `edit` links ahead of the article.
fn entry_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::feed::refresh;
    use crate::test_support::{FakeSummarizer, MemoryStore};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Acme Engineering</title>
    <link>https://acme.com/</link>
    <description>Posts</description>
    <item>
      <title>Scaling the pipeline</title>
      <link>https://acme.com/posts/scaling</link>
      <pubDate>Tue, 10 Oct 2023 09:00:00 GMT</pubDate>
    </item>
    <item>
      <description>No link here</description>
    </item>
    <item>
      <link>https://acme.com/posts/untitled</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn entries_without_links_are_skipped() {
        let candidates = parse_feed(RSS.as_bytes()).unwrap();
        let urls: Vec<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://acme.com/posts/scaling", "https://acme.com/posts/untitled"]
        );
    }

    #[test]
    fn missing_title_defaults_to_dash() {
        let candidates = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(candidates[0].title.as_deref(), Some("Scaling the pipeline"));
        assert_eq!(candidates[1].title.as_deref(), Some("-"));
    }

    #[test]
    fn publish_date_is_kept_in_millis() {
        let candidates = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(candidates[0].published_at, Some(1_696_928_400_000));
        assert_eq!(candidates[1].published_at, None);
    }

    #[test]
    fn atom_entries_use_the_alternate_link() {
        let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Blog</title>
  <id>tag:blog.example.com,1999:blog-1</id>
  <updated>2024-01-15T10:00:00Z</updated>
  <entry>
    <id>tag:blog.example.com,1999:post-1</id>
    <title>A post</title>
    <updated>2024-01-15T10:00:00Z</updated>
    <link rel="replies" type="application/atom+xml" href="https://blog.example.com/feeds/1/comments/default"/>
    <link rel="edit" type="application/atom+xml" href="https://www.blogger.com/feeds/1/posts/default/1"/>
    <link rel="alternate" type="text/html" href="https://blog.example.com/2024/01/post.html"/>
  </entry>
  <entry>
    <id>tag:blog.example.com,1999:post-2</id>
    <title>Only a comments link</title>
    <updated>2024-01-14T10:00:00Z</updated>
    <link rel="replies" href="https://blog.example.com/feeds/2/comments/default"/>
  </entry>
</feed>"#;

        let urls: Vec<String> = parse_feed(atom.as_bytes())
            .unwrap()
            .into_iter()
            .map(|c| c.url)
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://blog.example.com/2024/01/post.html",
                "https://blog.example.com/feeds/2/comments/default",
            ]
        );
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(parse_feed(b"definitely not a feed").is_err());
    }

    #[tokio::test]
    async fn refresh_stores_summarized_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RSS))
            .mount(&server)
            .await;

        let summarizer = Arc::new(FakeSummarizer::default());
        let adapter = RssAdapter::new(ContentFetcher::new().unwrap(), summarizer.clone());
        let store = MemoryStore::with_keys(&["acme:https://acme.com/posts/untitled"]);
        let key = format!("acme:{}/feed", server.uri());

        assert_eq!(refresh(&adapter, &store, &key).await, 1);

        let item = store.item("acme:https://acme.com/posts/scaling").unwrap();
        assert_eq!(item.source_type, SourceType::Rss);
        assert_eq!(item.title, "Scaling the pipeline");
        assert_eq!(item.description, "Summary of https://acme.com/posts/scaling");
        assert_eq!(item.unix_time, 1_696_928_400_000);
        assert_eq!(
            summarizer.calls(),
            vec!["article:https://acme.com/posts/scaling"]
        );
    }

    #[tokio::test]
    async fn unreachable_feed_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let summarizer = Arc::new(FakeSummarizer::default());
        let adapter = RssAdapter::new(ContentFetcher::new().unwrap(), summarizer.clone());
        let store = MemoryStore::default();

        assert_eq!(refresh(&adapter, &store, &format!("acme:{}/feed", server.uri())).await, 0);
        assert!(store.batches.lock().unwrap().is_empty());
        assert!(summarizer.calls().is_empty());
    }
}
