use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::services::ContentFetcher;

use super::client::CompletionClient;

/// Generates the text stored alongside each new content item.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Fetches the article at `url` and summarizes it.
    async fn summarize_article(&self, url: &str) -> Result<String>;

    /// Fetches the article at `url` and asks for its title.
    async fn extract_title(&self, url: &str) -> Result<String>;

    async fn summarize_video(&self, title: &str, description: &str) -> Result<String>;
}

/// `Summarizer` backed by a completion model. Article prompts are built from
/// `extract_prompt_text`.
pub struct LlmSummarizer {
    completion: Box<dyn CompletionClient>,
    fetcher: ContentFetcher,
}

impl LlmSummarizer {
    pub fn new(completion: Box<dyn CompletionClient>, fetcher: ContentFetcher) -> Self {
        Self {
            completion,
            fetcher,
        }
    }

    async fn complete(&self, prompt: String) -> Result<String> {
        let text = self.completion.complete(&prompt).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyCompletion);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize_article(&self, url: &str) -> Result<String> {
        let content = self.fetcher.fetch_prompt_text(url).await?;
        self.complete(format!(
            "Write a concise summary for the following article that has been scraped from the web:\n\n{}\n\nSummary:",
            content
        ))
        .await
    }

    async fn extract_title(&self, url: &str) -> Result<String> {
        let content = self.fetcher.fetch_prompt_text(url).await?;
        self.complete(format!(
            "Give me the title of this article that has been scraped from the web:\n\n{}\n\nTitle:",
            content
        ))
        .await
    }

    async fn summarize_video(&self, title: &str, description: &str) -> Result<String> {
        self.complete(format!(
            "Summarize the following YouTube video for a website card display:\nTitle: {}\nDescription: {}\n\nSummary:",
            title, description
        ))
        .await
    }
}
