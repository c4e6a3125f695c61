use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

pub const SOURCE_PARTITION: &str = "source";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Rss,
    Web,
    Youtube,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Rss => "rss",
            SourceType::Web => "web",
            SourceType::Youtube => "youtube",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rss" => Ok(SourceType::Rss),
            "web" => Ok(SourceType::Web),
            "youtube" => Ok(SourceType::Youtube),
            other => Err(AppError::InvalidSource(format!("unknown source type '{}'", other))),
        }
    }
}

/// A configured origin, stored under the `source` partition.
///
/// `key` is the record's sort key, `<name>:<origin-url>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub key: String,
    pub source_type: SourceType,
    pub content_url_pattern: Option<String>,
}

/// The two halves of a source key. Only the first colon separates them,
/// origin URLs keep their own colons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub name: String,
    pub origin: String,
}

impl SourceDescriptor {
    pub fn parse(key: &str) -> Result<Self> {
        let (name, origin) = key
            .split_once(':')
            .ok_or_else(|| AppError::InvalidSource(format!("missing ':' in '{}'", key)))?;

        if name.is_empty() || origin.is_empty() {
            return Err(AppError::InvalidSource(format!(
                "expected <name>:<url>, got '{}'",
                key
            )));
        }

        Ok(Self {
            name: name.to_string(),
            origin: origin.to_string(),
        })
    }

    /// Sort key of a content record discovered through this source.
    pub fn item_key(&self, item_url: &str) -> String {
        format!("{}:{}", self.name, item_url)
    }
}
