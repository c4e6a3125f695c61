use std::sync::Arc;

use regex::Regex;
use url::Url;

mod ai;
mod config;
mod crawler;
mod db;
mod error;
mod feed;
mod models;
mod services;
#[cfg(test)]
mod test_support;

use ai::{ClaudeClient, CompletionClient, LlmSummarizer};
use config::Config;
use crawler::Crawler;
use db::{Repository, Store};
use error::{AppError, Result};
use models::{Source, SourceDescriptor, SourceType};
use services::ContentFetcher;

const USAGE: &str = "usage: content-crawler [--add-source <name:url> <rss|web|youtube> [pattern] | --sources | --recent [n]]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration and open the database
    let config = Config::load()?;
    let repository = Arc::new(Repository::new(&config.db_path).await?);

    // No flag means a crawl
    match args.get(1).map(String::as_str) {
        None => crawl(&config, repository).await,
        Some("--add-source") => add_source(&repository, &args[2..]).await,
        Some("--sources") => list_sources(&repository).await,
        Some("--recent") => {
            let limit = match args.get(2) {
                Some(n) => n
                    .parse()
                    .map_err(|_| AppError::Config(format!("invalid count '{}'", n)))?,
                None => 20,
            };
            list_recent(&repository, limit).await
        }
        Some(_) => Err(AppError::Config(USAGE.to_string())),
    }
}

async fn crawl(config: &Config, repository: Arc<Repository>) -> Result<()> {
    let completion = ClaudeClient::new(config.anthropic_api_key()?.to_string(), config.model.clone())?;
    tracing::info!(model = completion.model(), "Starting crawl");

    // Wire up the summarizer and adapters
    let fetcher = ContentFetcher::new()?;
    let summarizer = Arc::new(LlmSummarizer::new(Box::new(completion), fetcher.clone()));
    let crawler = Crawler::new(repository, summarizer, fetcher, config);

    crawler.run_once().await;
    Ok(())
}

async fn add_source(repository: &Repository, args: &[String]) -> Result<()> {
    let (key, kind) = match args {
        [key, kind, ..] => (key, kind),
        _ => return Err(AppError::Config(USAGE.to_string())),
    };

    let descriptor = SourceDescriptor::parse(key)?;
    Url::parse(&descriptor.origin)?;
    let source_type: SourceType = kind.parse()?;

    let content_url_pattern = args.get(2).cloned();
    match (&source_type, &content_url_pattern) {
        (SourceType::Web, None) => {
            return Err(AppError::InvalidSource(
                "web sources need a content URL pattern".to_string(),
            ))
        }
        (_, Some(pattern)) => {
            Regex::new(pattern)?;
        }
        _ => {}
    }

    let created = repository
        .upsert_source(Source {
            key: key.clone(),
            source_type,
            content_url_pattern,
        })
        .await?;

    println!(
        "{} {} source '{}' ({})",
        if created { "Added" } else { "Updated" },
        source_type,
        descriptor.name,
        descriptor.origin
    );
    Ok(())
}

async fn list_sources(repository: &Repository) -> Result<()> {
    let sources = repository.load_sources().await?;
    for source in &sources {
        match &source.content_url_pattern {
            Some(pattern) => println!("{:<8} {}  [{}]", source.source_type, source.key, pattern),
            None => println!("{:<8} {}", source.source_type, source.key),
        }
    }
    println!("{} source(s)", sources.len());
    Ok(())
}

async fn list_recent(repository: &Repository, limit: usize) -> Result<()> {
    for item in repository.recent_content(limit).await? {
        let when = chrono::DateTime::from_timestamp_millis(item.unix_time)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{}  {:<8} {}", when, item.source_type, item.title);
        println!("    {}", item.key);
        println!("    {}", item.description);
    }
    Ok(())
}
