use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};

const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Prompt input is capped at this many whitespace-delimited tokens.
pub const MAX_PROMPT_TOKENS: usize = 600;

/// A `<div>` counts as the main block once its text is longer than this.
const MIN_DIV_CHARS: usize = 500;

/// HTTP access to source pages, shared by the adapters and the summarizer.
#[derive(Clone)]
pub struct ContentFetcher {
    client: Client,
}

impl ContentFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT_STRING)
            .build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Page body decoded with the charset the server declares.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetches `url` and reduces it to the text a summary prompt is built from.
    pub async fn fetch_prompt_text(&self, url: &str) -> Result<String> {
        let html = self.fetch_html(url).await?;
        Ok(extract_prompt_text(&html))
    }
}

/// Page title, meta description and the best guess at the main content
/// block, truncated to `MAX_PROMPT_TOKENS`.
///
/// The main block is the first of: all `<main>` text, all `<article>` text,
/// the first `<div>` longer than `MIN_DIV_CHARS`, the whole document.
pub fn extract_prompt_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&selector("title"))
        .map(element_text)
        .collect::<String>();
    let description = doc
        .select(&selector(r#"meta[name="description"]"#))
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .unwrap_or_default();

    let mut main = doc.select(&selector("main")).map(element_text).collect::<String>();
    if main.is_empty() {
        main = doc
            .select(&selector("article"))
            .map(element_text)
            .collect::<String>();
    }
    if main.is_empty() {
        main = doc
            .select(&selector("div"))
            .map(element_text)
            .find(|text| text.chars().count() > MIN_DIV_CHARS)
            .unwrap_or_default();
    }
    if main.is_empty() {
        main = element_text(doc.root_element());
    }

    let text = format!("{}\n\n{}\n\n{}", title, description, main);
    truncate_tokens(text.trim(), MAX_PROMPT_TOKENS)
}

/// Keeps the first `max_tokens` whitespace-delimited tokens, joined by single
/// spaces and followed by `...`. Text within the limit is returned unchanged.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    if text.split_whitespace().count() <= max_tokens {
        return text.to_string();
    }

    let mut truncated = text
        .split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ");
    truncated.push_str("...");
    truncated
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

// Only called with literal selectors.
fn selector(s: &str) -> Selector {
    Selector::parse(s).unwrap()
}
