//! In-memory fakes for the store and summarizer seams.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai::Summarizer;
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{ContentItem, Source, SourceType, CONTENT_PARTITION};

#[derive(Default)]
pub struct MemoryStore {
    pub sources: Vec<Source>,
    pub sources_unavailable: bool,
    pub items: Mutex<Vec<ContentItem>>,
    pub batches: Mutex<Vec<usize>>,
}

impl MemoryStore {
    pub fn with_keys(keys: &[&str]) -> Self {
        let items = keys
            .iter()
            .map(|key| ContentItem {
                key: key.to_string(),
                source_type: SourceType::Rss,
                title: "-".into(),
                description: "already stored".into(),
                unix_time: 0,
            })
            .collect();
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.lock().unwrap().iter().map(|i| i.key.clone()).collect()
    }

    pub fn item(&self, key: &str) -> Option<ContentItem> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.key == key)
            .cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_sources(&self) -> Result<Vec<Source>> {
        if self.sources_unavailable {
            return Err(AppError::Other(anyhow::anyhow!("store unreachable")));
        }
        Ok(self.sources.clone())
    }

    async fn item_exists(&self, partition: &str, sort: &str) -> Result<bool> {
        Ok(partition == CONTENT_PARTITION
            && self.items.lock().unwrap().iter().any(|i| i.key == sort))
    }

    async fn write_batch(&self, items: &[ContentItem]) -> Result<()> {
        self.batches.lock().unwrap().push(items.len());
        self.items.lock().unwrap().extend_from_slice(items);
        Ok(())
    }
}

/// Answers every request with a canned string; inputs listed in `failing`
/// (article URLs or video titles) are rejected.
#[derive(Default)]
pub struct FakeSummarizer {
    pub failing: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSummarizer {
    pub fn failing(inputs: &[&str]) -> Self {
        Self {
            failing: inputs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self, input: &str) -> Result<()> {
        if self.failing.iter().any(|f| f == input) {
            return Err(AppError::EmptyCompletion);
        }
        Ok(())
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize_article(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(format!("article:{}", url));
        self.check(url)?;
        Ok(format!("Summary of {}", url))
    }

    async fn extract_title(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(format!("title:{}", url));
        self.check(url)?;
        Ok(format!("Title of {}", url))
    }

    async fn summarize_video(&self, title: &str, _description: &str) -> Result<String> {
        self.calls.lock().unwrap().push(format!("video:{}", title));
        self.check(title)?;
        Ok(format!("Summary of {}", title))
    }
}
