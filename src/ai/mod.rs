mod client;
mod summarizer;

pub use client::{ClaudeClient, CompletionClient, DEFAULT_MODEL};
pub use summarizer::{LlmSummarizer, Summarizer};
