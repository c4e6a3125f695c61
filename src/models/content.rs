use chrono::Utc;

use super::SourceType;

pub const CONTENT_PARTITION: &str = "content";

/// A discovered item, stored once under the `content` partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// `<source-name>:<item-url>`
    pub key: String,
    pub source_type: SourceType,
    pub title: String,
    pub description: String,
    /// Milliseconds since the epoch.
    pub unix_time: i64,
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
